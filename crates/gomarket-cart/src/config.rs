//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_KEY=@GoMarket:productsInCart                      │
//! │     GOMARKET_DB_PATH=/data/gomarket.db                                 │
//! │     GOMARKET_MAX_WRITE_ATTEMPTS=5                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/com.gomarket.app/cart.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarket:productsInCart"
//! database_path = "/data/gomarket.db"
//!
//! [persistence]
//! max_write_attempts = 5
//! initial_backoff_ms = 100
//! max_backoff_ms = 5000
//! event_capacity = 64
//! ```

use std::path::PathBuf;
use std::time::Duration;

use gomarket_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Key the cart record is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarket:productsInCart";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key of the single persisted record.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// Write queue behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Attempts per record write before it is reported as failed.
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,

    /// Initial backoff between attempts (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff between attempts (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Buffer size of the persistence event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_max_write_attempts() -> u32 {
    5
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    5_000
}

fn default_event_capacity() -> usize {
    64
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            max_write_attempts: default_max_write_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            event_capacity: default_event_capacity(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage key must not be blank".into()));
        }

        if self.persistence.max_write_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_write_attempts must be greater than 0".into(),
            ));
        }

        if self.persistence.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_capacity must be greater than 0".into(),
            ));
        }

        if self.persistence.initial_backoff_ms > self.persistence.max_backoff_ms {
            return Err(ConfigError::Invalid(format!(
                "initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.persistence.initial_backoff_ms, self.persistence.max_backoff_ms
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GOMARKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Ok(path) = std::env::var("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Ok(attempts) = std::env::var("GOMARKET_MAX_WRITE_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.persistence.max_write_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring invalid GOMARKET_MAX_WRITE_ATTEMPTS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "gomarket", "app")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Key of the persisted cart record.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Database file: the configured path, else the platform data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("gomarket.db"))
        })
    }

    /// Builds the SQLite storage configuration.
    pub fn storage_config(&self) -> Result<StorageConfig, ConfigError> {
        self.database_path()
            .map(StorageConfig::new)
            .ok_or_else(|| ConfigError::Invalid("Could not determine app data directory".into()))
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.persistence.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.persistence.max_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.storage_key(), "@GoMarket:productsInCart");
        assert_eq!(config.persistence.max_write_attempts, 5);
        assert_eq!(config.initial_backoff(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();

        config.storage.key = "  ".to_string();
        assert!(config.validate().is_err());

        config.storage.key = "cart".to_string();
        config.persistence.max_write_attempts = 0;
        assert!(config.validate().is_err());

        config.persistence.max_write_attempts = 1;
        config.persistence.initial_backoff_ms = 10_000;
        assert!(config.validate().is_err());

        config.persistence.initial_backoff_ms = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartConfig = toml::from_str(
            r#"
            [storage]
            key = "@Test:cart"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_key(), "@Test:cart");
        assert_eq!(config.persistence.max_backoff_ms, 5_000);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let config = CartConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[persistence]"));
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.toml");

        let mut config = CartConfig::default();
        config.storage.database_path = Some(dir.path().join("cart.db"));
        config.persistence.max_write_attempts = 3;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: CartConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.persistence.max_write_attempts, 3);
        assert_eq!(loaded.database_path(), Some(dir.path().join("cart.db")));
    }

    #[test]
    fn test_load_applies_file_then_env() {
        const ENV_VARS: [&str; 3] = [
            "GOMARKET_STORAGE_KEY",
            "GOMARKET_DB_PATH",
            "GOMARKET_MAX_WRITE_ATTEMPTS",
        ];
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        let dir = tempfile::tempdir().unwrap();

        // Missing file: defaults
        let config = CartConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
        assert_eq!(config.persistence.max_write_attempts, 5);

        let path = dir.path().join("cart.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            key = "@File:cart"

            [persistence]
            max_write_attempts = 3
            "#,
        )
        .unwrap();

        // File over defaults
        let config = CartConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.storage_key(), "@File:cart");
        assert_eq!(config.persistence.max_write_attempts, 3);
        assert_eq!(config.persistence.max_backoff_ms, 5_000);

        // Environment over file
        std::env::set_var("GOMARKET_STORAGE_KEY", "@Env:cart");
        std::env::set_var("GOMARKET_MAX_WRITE_ATTEMPTS", "7");
        std::env::set_var("GOMARKET_DB_PATH", dir.path().join("env.db"));
        let config = CartConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.storage_key(), "@Env:cart");
        assert_eq!(config.persistence.max_write_attempts, 7);
        assert_eq!(config.database_path(), Some(dir.path().join("env.db")));

        // Unparseable value is ignored, the file value stays
        std::env::set_var("GOMARKET_MAX_WRITE_ATTEMPTS", "many");
        let config = CartConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.persistence.max_write_attempts, 3);

        // Zero parses but fails validation
        std::env::set_var("GOMARKET_MAX_WRITE_ATTEMPTS", "0");
        assert!(matches!(
            CartConfig::load(Some(path.clone())),
            Err(ConfigError::Invalid(_))
        ));

        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_invalid_toml_is_load_error() {
        let err = toml::from_str::<CartConfig>("[storage\nkey = 1").unwrap_err();
        assert!(matches!(ConfigError::from(err), ConfigError::LoadFailed(_)));
    }

    #[test]
    fn test_storage_config_uses_explicit_path() {
        let mut config = CartConfig::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/cart.db"));

        let storage = config.storage_config().unwrap();
        assert_eq!(storage.database_path, PathBuf::from("/tmp/cart.db"));
    }
}
