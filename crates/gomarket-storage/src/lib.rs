//! # gomarket-storage: Key-Value Storage for the GoMarket Cart
//!
//! The cart persists itself as one text record under one key. This crate
//! defines the asynchronous key-value API it talks to and ships the
//! backends.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Data Flow                               │
//! │                                                                         │
//! │  CartPersister (gomarket-cart write queue)                             │
//! │       │  get_item / set_item                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 gomarket-storage (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  SqliteStore  │    │  MemoryStore │  │   │
//! │  │   │   (kv.rs)     │◄───│  (sqlite.rs)  │    │  (memory.rs) │  │   │
//! │  │   │   the seam    │◄───┼───────────────┼────│  tests       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite database (kv_store table)                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_storage::{KeyValueStore, SqliteStore, StorageConfig};
//!
//! let store = SqliteStore::new(StorageConfig::new("gomarket.db")).await?;
//! store.set_item("@GoMarket:productsInCart", "[]").await?;
//! let record = store.get_item("@GoMarket:productsInCart").await?;
//! ```

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StorageConfig};
