//! # gomarket-core: Pure Cart Logic for GoMarket
//!
//! This crate is the **heart** of the GoMarket cart. It holds the line item
//! types and every rule that governs how a cart changes, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (consumers)                        │   │
//! │  │    Product list ──► Cart screen ──► Checkout button             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartHandle                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gomarket-cart (Cart Store)                      │   │
//! │  │    add_to_cart, increment, decrement, write queue               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   cart    │  │ validation│                  │   │
//! │  │   │ LineItem  │  │   Cart    │  │   rules   │                  │   │
//! │  │   │ Totals    │  │  record   │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO RUNTIME • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types (`LineItem`, `NewLineItem`, `CartTotals`)
//! - [`cart`] - The ordered, id-unique `Cart` and its operations
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, NewLineItem};
//!
//! let mut cart = Cart::new();
//! let apple = NewLineItem::new("A", "Apple", "u", 1.5);
//!
//! cart.add_item(apple.clone()).unwrap();
//! cart.add_item(apple).unwrap();
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.get("A").map(|item| item.quantity), Some(2));
//! ```

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, Decrement};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{CartTotals, LineItem, NewLineItem};
