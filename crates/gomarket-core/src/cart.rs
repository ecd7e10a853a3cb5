//! # Cart
//!
//! The ordered, id-unique list of line items and the rules for changing it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_item(new)                                                         │
//! │    ├── id absent  ──► push { ..new, quantity: 1 }  (keeps insert order) │
//! │    └── id present ──► quantity += 1 (stored title/price/image kept)     │
//! │                                                                         │
//! │  increment(id)                                                         │
//! │    ├── id present ──► quantity += 1                                    │
//! │    └── id absent  ──► Err(ItemNotFound), cart untouched                │
//! │                                                                         │
//! │  decrement(id)                                                         │
//! │    ├── quantity > 1 ─► quantity -= 1                                   │
//! │    ├── quantity = 1 ─► line removed                                    │
//! │    └── id absent  ──► Err(ItemNotFound), cart untouched                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every line has `quantity >= 1`
//! - No two lines share an id
//! - Lines keep the order in which they were first added

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartTotals, LineItem, NewLineItem};
use crate::validation::{validate_new_item, validate_quantity};

/// Outcome of a decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The line is still in the cart with this quantity.
    Reduced(u32),

    /// The line had quantity 1 and was removed.
    Removed,
}

/// The shopping cart.
///
/// Serializes as a bare JSON array of line items, which is exactly the
/// persisted record. Deserializing goes through [`Cart::from_items`], so a
/// decoded cart always satisfies the invariants.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CoreError;

    fn try_from(items: Vec<LineItem>) -> CoreResult<Self> {
        Cart::from_items(items)
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from existing lines, checking the cart invariants.
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` if any line has quantity 0
    /// - `Validation(Duplicate)` if two lines share an id
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());

        for item in &items {
            validate_quantity(item.quantity)?;

            if !seen.insert(item.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: item.id.clone(),
                }
                .into());
            }
        }

        Ok(Cart { items })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product to the cart or increases its quantity if already present.
    ///
    /// ## Returns
    /// The line's quantity after the add.
    pub fn add_item(&mut self, item: NewLineItem) -> CoreResult<u32> {
        validate_new_item(&item)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = bump(existing)?;
            return Ok(existing.quantity);
        }

        self.items.push(item.into_line_item());
        Ok(1)
    }

    /// Increases the quantity of an existing line by one.
    pub fn increment(&mut self, id: &str) -> CoreResult<u32> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

        item.quantity = bump(item)?;
        Ok(item.quantity)
    }

    /// Decreases the quantity of an existing line by one, removing it at zero.
    pub fn decrement(&mut self, id: &str) -> CoreResult<Decrement> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

        let Some(item) = self.items.get_mut(index) else {
            return Err(CoreError::ItemNotFound(id.to_string()));
        };

        if item.quantity <= 1 {
            self.items.remove(index);
            Ok(Decrement::Removed)
        } else {
            item.quantity -= 1;
            Ok(Decrement::Reduced(item.quantity))
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the line with this id, if any.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: u32::try_from(self.items.len()).unwrap_or(u32::MAX),
            total_quantity: self.total_quantity(),
            subtotal: self.subtotal(),
        }
    }

    // =========================================================================
    // Persisted Record
    // =========================================================================

    /// Encodes the cart as the persisted record (a JSON array of lines).
    pub fn to_record(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Decodes a persisted record, checking the cart invariants.
    pub fn from_record(record: &str) -> CoreResult<Self> {
        let items: Vec<LineItem> = serde_json::from_str(record)?;
        Cart::from_items(items)
    }
}

fn bump(item: &LineItem) -> CoreResult<u32> {
    item.quantity
        .checked_add(1)
        .ok_or_else(|| CoreError::QuantityOverflow {
            id: item.id.clone(),
            max: u32::MAX,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> NewLineItem {
        NewLineItem::new("A", "Apple", "u", 1.5)
    }

    fn banana() -> NewLineItem {
        NewLineItem::new("B", "Banana", "https://img/b.png", 0.25)
    }

    fn quantity(cart: &Cart, id: &str) -> Option<u32> {
        cart.get(id).map(|i| i.quantity)
    }

    #[test]
    fn test_add_new_item_starts_at_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(apple()).unwrap(), 1);
        assert_eq!(cart.items(), &[apple().into_line_item()]);
    }

    #[test]
    fn test_add_same_item_twice_increments() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        assert_eq!(cart.add_item(apple()).unwrap(), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(quantity(&cart, "A"), Some(2));
    }

    #[test]
    fn test_add_existing_keeps_stored_fields() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        cart.add_item(NewLineItem::new("A", "Green Apple", "other", 9.0))
            .unwrap();

        let item = cart.get("A").unwrap();
        assert_eq!(item.title, "Apple");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.price, 1.5);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(banana()).unwrap();
        cart.add_item(apple()).unwrap();
        cart.add_item(banana()).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_add_rejects_invalid_item() {
        let mut cart = Cart::new();
        let err = cart
            .add_item(NewLineItem::new("A", "Apple", "u", -2.0))
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increment_then_decrement_is_inverse() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        cart.add_item(apple()).unwrap();

        assert_eq!(cart.increment("A").unwrap(), 3);
        assert_eq!(cart.decrement("A").unwrap(), Decrement::Reduced(2));
        assert_eq!(quantity(&cart, "A"), Some(2));
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        cart.add_item(banana()).unwrap();

        assert_eq!(cart.decrement("A").unwrap(), Decrement::Removed);
        assert!(cart.get("A").is_none());
        assert_eq!(quantity(&cart, "B"), Some(1));
    }

    #[test]
    fn test_missing_id_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        let before = cart.clone();

        assert!(matches!(
            cart.increment("Z"),
            Err(CoreError::ItemNotFound(id)) if id == "Z"
        ));
        assert!(matches!(
            cart.decrement("Z"),
            Err(CoreError::ItemNotFound(id)) if id == "Z"
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_overflow_is_rejected() {
        let mut item = apple().into_line_item();
        item.quantity = u32::MAX;
        let mut cart = Cart::from_items(vec![item]).unwrap();

        assert!(matches!(
            cart.increment("A"),
            Err(CoreError::QuantityOverflow { .. })
        ));
        assert_eq!(quantity(&cart, "A"), Some(u32::MAX));
    }

    #[test]
    fn test_apple_scenario() {
        let mut cart = Cart::new();

        cart.add_item(apple()).unwrap();
        assert_eq!(quantity(&cart, "A"), Some(1));

        cart.add_item(apple()).unwrap();
        assert_eq!(quantity(&cart, "A"), Some(2));

        cart.increment("A").unwrap();
        assert_eq!(quantity(&cart, "A"), Some(3));

        cart.decrement("A").unwrap();
        cart.decrement("A").unwrap();
        assert_eq!(quantity(&cart, "A"), Some(1));

        cart.decrement("A").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        cart.add_item(apple()).unwrap();
        cart.add_item(banana()).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal, 3.25);
    }

    #[test]
    fn test_record_round_trip() {
        let mut cart = Cart::new();
        cart.add_item(apple()).unwrap();
        cart.add_item(banana()).unwrap();
        cart.increment("B").unwrap();

        let record = cart.to_record().unwrap();
        assert!(record.starts_with('['));
        assert_eq!(Cart::from_record(&record).unwrap(), cart);
    }

    #[test]
    fn test_from_record_rejects_broken_invariants() {
        let zero = r#"[{"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":0}]"#;
        assert!(matches!(
            Cart::from_record(zero),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let dup = r#"[
            {"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":1},
            {"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":2}
        ]"#;
        assert!(matches!(
            Cart::from_record(dup),
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        assert!(matches!(
            Cart::from_record("{not json"),
            Err(CoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let zero = r#"[{"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":0}]"#;
        let err = serde_json::from_str::<Cart>(zero).unwrap_err();
        assert!(err.to_string().contains("quantity must be positive"));

        let dup = r#"[
            {"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":1},
            {"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":1}
        ]"#;
        let err = serde_json::from_str::<Cart>(dup).unwrap_err();
        assert!(err.to_string().contains("'A' already exists"));

        let ok = r#"[{"id":"A","title":"Apple","image_url":"u","price":1.5,"quantity":2}]"#;
        let cart: Cart = serde_json::from_str(ok).unwrap();
        assert_eq!(quantity(&cart, "A"), Some(2));
        assert_eq!(serde_json::to_string(&cart).unwrap(), cart.to_record().unwrap());
    }

    #[test]
    fn test_invariants_hold_for_mixed_sequences() {
        let ids = ["A", "B", "C", "D"];
        let mut cart = Cart::new();
        let mut seed: u64 = 0x5eed;

        for _ in 0..2_000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let id = ids[(seed >> 33) as usize % ids.len()];

            match (seed >> 40) % 3 {
                0 => {
                    cart.add_item(NewLineItem::new(id, "Item", "u", 1.0)).unwrap();
                }
                1 => {
                    let _ = cart.increment(id);
                }
                _ => {
                    let _ = cart.decrement(id);
                }
            }

            let mut seen = HashSet::new();
            for item in cart.items() {
                assert!(item.quantity >= 1);
                assert!(seen.insert(item.id.clone()));
            }
        }
    }
}
