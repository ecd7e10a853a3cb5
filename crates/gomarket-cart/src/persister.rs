//! # Cart Persister
//!
//! The single background task that reads and writes the cart record.
//!
//! ## Write Queue Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Persister Flow                                  │
//! │                                                                         │
//! │  CartHandle mutation (holds state lock)                                │
//! │       │  revision += 1                                                 │
//! │       │  queue.send(Write { revision, record })                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  unbounded mpsc queue                           │   │
//! │  │   Write r1 │ Write r2 │ Flush │ Write r3 ...                    │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CartPersister::run                           │   │
//! │  │                                                                 │   │
//! │  │  1. load(): get_item(key) once → hydrate in-memory cart         │   │
//! │  │  2. recv Write → drain queued Writes, keep the newest           │   │
//! │  │  3. set_item(key, record), retry with exponential backoff       │   │
//! │  │  4. emit PersistEvent::Persisted / Failed                       │   │
//! │  │  5. answer Flush waiters seen so far                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Enqueueing under the state lock makes queue order = commit order,     │
//! │  so the last write always carries the last committed cart.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use gomarket_core::Cart;
use gomarket_storage::KeyValueStore;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::CartConfig;

// =============================================================================
// Commands & Events
// =============================================================================

/// Work items for the persister.
#[derive(Debug)]
pub(crate) enum PersistCommand {
    /// Replace the stored record with this cart revision.
    Write { revision: u64, record: String },

    /// Signal once every command queued before this one has been handled.
    Flush(oneshot::Sender<()>),
}

/// Outcome notifications from the persister.
///
/// Write failures are reported here rather than to the mutation caller:
/// the cart stays usable while storage is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistEvent {
    /// The stored record was loaded into memory.
    Hydrated { items: usize },

    /// The stored record could not be read or parsed; the cart started empty.
    HydrationFailed { error: String },

    /// `revision` is now the stored record.
    Persisted { revision: u64, at: DateTime<Utc> },

    /// Writing `revision` failed after `attempts` tries.
    Failed {
        revision: u64,
        attempts: u32,
        error: String,
    },
}

// =============================================================================
// Persister
// =============================================================================

pub(crate) struct CartPersister<S> {
    storage: S,
    key: String,
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    commands: mpsc::UnboundedReceiver<PersistCommand>,
    events: broadcast::Sender<PersistEvent>,
}

impl<S: KeyValueStore> CartPersister<S> {
    pub(crate) fn new(
        storage: S,
        config: &CartConfig,
        commands: mpsc::UnboundedReceiver<PersistCommand>,
        events: broadcast::Sender<PersistEvent>,
    ) -> Self {
        CartPersister {
            storage,
            key: config.storage_key().to_string(),
            max_attempts: config.persistence.max_write_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            commands,
            events,
        }
    }

    /// Reads the stored record. Any failure yields an empty cart.
    ///
    /// The returned event is also broadcast.
    pub(crate) async fn load(&self) -> (Cart, PersistEvent) {
        let (cart, event) = self.read_stored().await;
        self.emit(event.clone());
        (cart, event)
    }

    async fn read_stored(&self) -> (Cart, PersistEvent) {
        let record = match self.storage.get_item(&self.key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(key = %self.key, "No stored cart, starting empty");
                return (Cart::new(), PersistEvent::Hydrated { items: 0 });
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored cart, starting empty");
                let error = e.to_string();
                return (Cart::new(), PersistEvent::HydrationFailed { error });
            }
        };

        match Cart::from_record(&record) {
            Ok(cart) => {
                info!(key = %self.key, items = cart.len(), "Cart hydrated from storage");
                let items = cart.len();
                (cart, PersistEvent::Hydrated { items })
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored cart is corrupt, starting empty");
                let error = e.to_string();
                (Cart::new(), PersistEvent::HydrationFailed { error })
            }
        }
    }

    /// Drains the queue until every sender is gone.
    pub(crate) async fn run(mut self) {
        info!(key = %self.key, "Cart persister starting");

        while let Some(command) = self.commands.recv().await {
            match command {
                PersistCommand::Write { revision, record } => {
                    let mut waiters = Vec::new();
                    let (revision, record) = self.coalesce(revision, record, &mut waiters);
                    self.write(revision, &record).await;
                    for waiter in waiters {
                        let _ = waiter.send(());
                    }
                }
                PersistCommand::Flush(waiter) => {
                    let _ = waiter.send(());
                }
            }
        }

        info!(key = %self.key, "Cart persister stopped");
    }

    /// Pulls every write already queued and keeps only the newest.
    ///
    /// Flush requests met on the way are answered after that newest write.
    fn coalesce(
        &mut self,
        mut revision: u64,
        mut record: String,
        waiters: &mut Vec<oneshot::Sender<()>>,
    ) -> (u64, String) {
        let mut skipped = 0usize;

        while let Ok(next) = self.commands.try_recv() {
            match next {
                PersistCommand::Write {
                    revision: newer,
                    record: newer_record,
                } => {
                    revision = newer;
                    record = newer_record;
                    skipped += 1;
                }
                PersistCommand::Flush(waiter) => waiters.push(waiter),
            }
        }

        if skipped > 0 {
            debug!(skipped, revision, "Coalesced queued cart writes");
        }

        (revision, record)
    }

    async fn write(&self, revision: u64, record: &str) {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.storage.set_item(&self.key, record).await {
                Ok(()) => {
                    debug!(revision, attempt, "Cart persisted");
                    self.emit(PersistEvent::Persisted {
                        revision,
                        at: Utc::now(),
                    });
                    return;
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!(revision, attempts = attempt, error = %e, "Giving up on cart write");
                    self.emit(PersistEvent::Failed {
                        revision,
                        attempts: attempt,
                        error: e.to_string(),
                    });
                    return;
                }
                Err(e) => {
                    let delay = backoff.next_backoff().unwrap_or(self.max_backoff);
                    debug!(revision, attempt, ?delay, error = %e, "Cart write failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    fn emit(&self, event: PersistEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
