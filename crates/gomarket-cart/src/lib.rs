//! # gomarket-cart: Cart Store for the GoMarket Mobile App
//!
//! Holds the cart in memory, hands consumers a handle with `products`,
//! `add_to_cart`, `increment` and `decrement`, and keeps one persisted
//! record in step with every change.
//!
//! ## Module Organization
//! ```text
//! gomarket_cart/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── store.rs        ◄─── CartProvider, CartHandle, CartContext
//! ├── persister.rs    ◄─── Hydration + write queue
//! ├── config.rs       ◄─── CartConfig (TOML + env)
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! └── error.rs        ◄─── CartError, ConfigError
//! ```
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Store Lifecycle                              │
//! │                                                                         │
//! │  CartProvider::new(storage, &config)                                   │
//! │       │  spawns persister holding the state lock                       │
//! │       ▼                                                                 │
//! │  Hydration: get_item(key) → replace empty cart (or stay empty)         │
//! │       │  lock released                                                 │
//! │       ▼                                                                 │
//! │  add_to_cart / increment / decrement                                   │
//! │       │  new cart committed, record enqueued                           │
//! │       ▼                                                                 │
//! │  Persister writes the newest record (retry + backoff)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shutdown(): flush queue, stop persister, handles go dead              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use gomarket_cart::{CartConfig, CartProvider};
//! use gomarket_core::NewLineItem;
//! use gomarket_storage::MemoryStore;
//!
//! # async fn demo() -> Result<(), gomarket_cart::CartError> {
//! let provider = CartProvider::new(MemoryStore::new(), &CartConfig::default()).await?;
//! let cart = provider.context().use_cart()?;
//!
//! cart.add_to_cart(NewLineItem::new("A", "Apple", "u", 1.5)).await?;
//! cart.increment("A").await?;
//!
//! provider.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod persister;
pub mod store;
pub mod telemetry;

pub use config::{CartConfig, PersistenceSettings, StorageSettings, DEFAULT_STORAGE_KEY};
pub use error::{CartError, CartResult, ConfigError};
pub use persister::PersistEvent;
pub use store::{CartContext, CartHandle, CartProvider};
pub use telemetry::init_tracing;
