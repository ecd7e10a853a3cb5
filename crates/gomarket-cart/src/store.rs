//! # Cart Store
//!
//! `CartProvider` owns the cart; `CartHandle`s are what the UI gets.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Ownership                                 │
//! │                                                                         │
//! │  CartProvider ──────── Arc<Shared> ──────────┐                         │
//! │       │                                       │                         │
//! │       │ handle() / context()                  ▼                         │
//! │       ▼                              ┌──────────────────┐               │
//! │  CartHandle ──── Weak<Shared> ──────►│ Mutex<CartState> │               │
//! │  CartHandle ──── Weak<Shared> ──────►│ queue sender     │               │
//! │  (cheap clones, one per consumer)    │ watch / events   │               │
//! │                                      └────────┬─────────┘               │
//! │                                               │ PersistCommand          │
//! │                                               ▼                         │
//! │                                      CartPersister task                 │
//! │                                                                         │
//! │  Provider dropped or shut down → handles return OutsideProvider.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hydration
//! The persister task is spawned holding the state lock. It releases the
//! lock only after the stored record is loaded, so every read or mutation
//! issued before hydration finishes simply waits for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use gomarket_core::{Cart, CartTotals, CoreResult, Decrement, LineItem, NewLineItem};
use gomarket_storage::{KeyValueStore, SqliteStore};
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CartConfig;
use crate::error::{CartError, CartResult, ConfigError};
use crate::persister::{CartPersister, PersistCommand, PersistEvent};

// =============================================================================
// Shared State
// =============================================================================

#[derive(Debug, Default)]
struct CartState {
    cart: Cart,

    /// Bumped on every committed mutation. Hydration is revision 0.
    revision: u64,

    /// How hydration went. Set before the lock is first released.
    hydration: Option<PersistEvent>,
}

#[derive(Debug)]
struct Shared {
    state: Arc<Mutex<CartState>>,
    queue: mpsc::UnboundedSender<PersistCommand>,
    changes: Arc<watch::Sender<Cart>>,
    events: broadcast::Sender<PersistEvent>,
    closed: AtomicBool,
}

impl Shared {
    /// Applies `op` to the cart and, if it succeeds, enqueues the new record.
    ///
    /// The record is enqueued before the lock is released.
    async fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Cart) -> CoreResult<T>,
    ) -> CartResult<T> {
        let mut state = self.state.lock().await;

        let out = match f(&mut state.cart) {
            Ok(out) => out,
            Err(e) => {
                warn!(op, error = %e, "Cart operation rejected");
                return Err(e.into());
            }
        };

        state.revision += 1;
        let revision = state.revision;
        let record = state.cart.to_record()?;

        if self
            .queue
            .send(PersistCommand::Write { revision, record })
            .is_err()
        {
            warn!(op, revision, "Cart persister stopped, change kept in memory only");
        }

        self.changes.send_replace(state.cart.clone());
        debug!(op, revision, items = state.cart.len(), "Cart updated");

        Ok(out)
    }

    async fn flush(&self) -> CartResult<oneshot::Receiver<()>> {
        let (tx, rx) = oneshot::channel();
        self.queue
            .send(PersistCommand::Flush(tx))
            .map_err(|_| CartError::PersisterStopped)?;
        Ok(rx)
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Owns the cart and its persister.
///
/// ## Usage
/// ```rust,ignore
/// let provider = CartProvider::new(MemoryStore::new(), &CartConfig::default()).await?;
/// let cart = provider.handle();
///
/// cart.add_to_cart(NewLineItem::new("A", "Apple", "u", 1.5)).await?;
/// provider.shutdown().await?;
/// ```
pub struct CartProvider {
    shared: Arc<Shared>,
    persister: JoinHandle<()>,
}

impl CartProvider {
    /// Creates the store over `storage` and starts hydrating it.
    ///
    /// Returns immediately; hydration runs in the background. Must be
    /// called from within a tokio runtime.
    pub async fn new<S: KeyValueStore>(storage: S, config: &CartConfig) -> CartResult<Self> {
        config.validate()?;

        let state = Arc::new(Mutex::new(CartState::default()));
        let mut hydrating = Arc::clone(&state).lock_owned().await;

        let (queue, commands) = mpsc::unbounded_channel();
        let (changes, _) = watch::channel(Cart::new());
        let changes = Arc::new(changes);
        let (events, _) = broadcast::channel(config.persistence.event_capacity);

        let persister = CartPersister::new(storage, config, commands, events.clone());
        let hydrated = Arc::clone(&changes);

        let persister = tokio::spawn(async move {
            let (cart, outcome) = persister.load().await;
            hydrating.cart = cart;
            hydrating.hydration = Some(outcome);
            hydrated.send_replace(hydrating.cart.clone());
            drop(hydrating);

            persister.run().await;
        });

        info!(key = %config.storage_key(), "Cart store created");

        Ok(CartProvider {
            shared: Arc::new(Shared {
                state,
                queue,
                changes,
                events,
                closed: AtomicBool::new(false),
            }),
            persister,
        })
    }

    /// Opens the SQLite database named by `config` and creates the store over it.
    pub async fn open(config: &CartConfig) -> CartResult<Self> {
        let storage_config = config.storage_config()?;

        if !storage_config.is_in_memory() {
            if let Some(parent) = storage_config.database_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError::Invalid(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let storage = SqliteStore::new(storage_config).await?;
        Self::new(storage, config).await
    }

    /// Returns a new handle to this store.
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns a context with this store installed.
    pub fn context(&self) -> CartContext {
        CartContext::with_cart(self.handle())
    }

    /// Waits for queued writes, then stops the persister.
    ///
    /// Handles stop working once this starts.
    pub async fn shutdown(self) -> CartResult<()> {
        info!("Shutting down cart store");

        let flushed = self.shared.flush().await?;
        self.shared.closed.store(true, Ordering::SeqCst);
        flushed.await.map_err(|_| CartError::PersisterStopped)?;

        let CartProvider { shared, persister } = self;
        drop(shared);

        persister.await.map_err(|e| {
            warn!(error = %e, "Cart persister task failed");
            CartError::PersisterStopped
        })?;

        info!("Cart store stopped");
        Ok(())
    }
}

// =============================================================================
// Handle
// =============================================================================

/// A consumer's view of the cart: `products` plus the three mutations.
///
/// Holds no ownership; once the provider is gone every call returns
/// `CartError::OutsideProvider`.
#[derive(Debug, Clone)]
pub struct CartHandle {
    shared: Weak<Shared>,
}

impl CartHandle {
    fn shared(&self) -> CartResult<Arc<Shared>> {
        let shared = self.shared.upgrade().ok_or(CartError::OutsideProvider)?;
        if shared.closed.load(Ordering::SeqCst) {
            return Err(CartError::OutsideProvider);
        }
        Ok(shared)
    }

    /// Current line items, in insertion order.
    pub async fn products(&self) -> CartResult<Vec<LineItem>> {
        let shared = self.shared()?;
        let state = shared.state.lock().await;
        Ok(state.cart.items().to_vec())
    }

    /// Current cart.
    pub async fn cart(&self) -> CartResult<Cart> {
        let shared = self.shared()?;
        let state = shared.state.lock().await;
        Ok(state.cart.clone())
    }

    pub async fn totals(&self) -> CartResult<CartTotals> {
        let shared = self.shared()?;
        let state = shared.state.lock().await;
        Ok(state.cart.totals())
    }

    /// Adds one unit of `item`, appending it if new.
    ///
    /// ## Returns
    /// The line's quantity after the add.
    pub async fn add_to_cart(&self, item: NewLineItem) -> CartResult<u32> {
        let shared = self.shared()?;
        debug!(item_id = %item.id, "add_to_cart");
        shared.mutate("add_to_cart", |cart| cart.add_item(item)).await
    }

    /// Adds one unit to an existing line.
    ///
    /// ## Errors
    /// `ItemNotFound` if no line has this id; the cart is unchanged.
    pub async fn increment(&self, id: &str) -> CartResult<u32> {
        let shared = self.shared()?;
        debug!(item_id = %id, "increment");
        shared.mutate("increment", |cart| cart.increment(id)).await
    }

    /// Removes one unit from an existing line, dropping the line at zero.
    ///
    /// ## Errors
    /// `ItemNotFound` if no line has this id; the cart is unchanged.
    pub async fn decrement(&self, id: &str) -> CartResult<Decrement> {
        let shared = self.shared()?;
        debug!(item_id = %id, "decrement");
        shared.mutate("decrement", |cart| cart.decrement(id)).await
    }

    /// Observes every committed cart, starting with the current one.
    pub fn subscribe(&self) -> CartResult<watch::Receiver<Cart>> {
        Ok(self.shared()?.changes.subscribe())
    }

    /// Outcome of loading the stored record, waiting for it if needed.
    ///
    /// Either `PersistEvent::Hydrated` or `PersistEvent::HydrationFailed`.
    pub async fn hydration(&self) -> CartResult<PersistEvent> {
        let shared = self.shared()?;
        let state = shared.state.lock().await;
        state.hydration.clone().ok_or(CartError::PersisterStopped)
    }

    /// Receives persistence outcomes from now on.
    ///
    /// Hydration may finish before this is called; use [`Self::hydration`]
    /// for its outcome.
    pub fn persist_events(&self) -> CartResult<broadcast::Receiver<PersistEvent>> {
        Ok(self.shared()?.events.subscribe())
    }

    /// Waits until every write enqueued so far has been attempted.
    pub async fn flush(&self) -> CartResult<()> {
        let flushed = self.shared()?.flush().await?;
        flushed.await.map_err(|_| CartError::PersisterStopped)
    }
}

// =============================================================================
// Context
// =============================================================================

/// Slot through which UI code looks up the cart.
///
/// An empty context models a consumer rendered outside any provider.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    handle: Option<CartHandle>,
}

impl CartContext {
    /// A context with no cart installed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_cart(handle: CartHandle) -> Self {
        CartContext {
            handle: Some(handle),
        }
    }

    /// Returns the installed cart handle.
    ///
    /// ## Errors
    /// `OutsideProvider` when no cart was installed.
    pub fn use_cart(&self) -> CartResult<CartHandle> {
        self.handle.clone().ok_or(CartError::OutsideProvider)
    }
}
