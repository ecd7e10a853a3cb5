//! # Cart Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Lookup      │  │      Storage            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  OutsideProvider│  │  ItemNotFound   │  │  Storage (open only)    │ │
//! │  │  Config         │  │                 │  │  writes → PersistEvent  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │   Validation    │  │      Core       │                              │
//! │  │                 │  │                 │                              │
//! │  │  bad add input  │  │  overflow,      │                              │
//! │  │                 │  │  record encode  │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::{CoreError, ValidationError};
use gomarket_storage::StorageError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Errors returned to cart consumers.
#[derive(Debug, Error)]
pub enum CartError {
    /// The handle was used after its provider went away, or no provider
    /// was installed in the context.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// `increment` / `decrement` on an id that is not in the cart.
    /// The cart is left unchanged.
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// `add_to_cart` input was rejected.
    #[error("Invalid item: {0}")]
    Validation(ValidationError),

    /// Any other cart rule violation.
    #[error(transparent)]
    Core(CoreError),

    /// The background writer has exited, so flush/shutdown cannot complete.
    #[error("Cart persister is not running")]
    PersisterStopped,

    /// Storage failed while opening the store.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => CartError::ItemNotFound(id),
            CoreError::Validation(e) => CartError::Validation(e),
            other => CartError::Core(other),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting has an unusable value.
    #[error("Invalid cart configuration: {0}")]
    Invalid(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    SaveFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}
