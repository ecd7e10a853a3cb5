//! Tracing subscriber setup for hosts embedding the cart.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,gomarket=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gomarket_cart=trace` - Trace the cart store only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_LOG_FILTER)
}

/// Same as [`init_tracing`] with a custom fallback filter.
pub fn init_tracing_with(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let _ = init_tracing();
        assert!(!init_tracing_with("warn"));
    }
}
