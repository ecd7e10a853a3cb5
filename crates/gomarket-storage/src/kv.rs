//! # Key-Value Store
//!
//! The asynchronous persistence API the cart writes through. It mirrors the
//! device storage API a mobile runtime offers: whole-value reads and writes
//! of text under string keys, no partial updates.

use std::future::Future;

use crate::error::StorageResult;

/// Asynchronous text key-value storage.
///
/// Implementations must be safe to move into a background task, so every
/// returned future is `Send`.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, or `None` if nothing is stored.
    fn get_item(&self, key: &str) -> impl Future<Output = StorageResult<Option<String>>> + Send;

    /// Replaces the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> impl Future<Output = StorageResult<()>> + Send;

    /// Deletes the value stored under `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = StorageResult<()>> + Send;
}
