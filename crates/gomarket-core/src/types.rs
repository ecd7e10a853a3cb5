//! # Domain Types
//!
//! Line item types shared by the cart, the persisted record and the
//! mobile front end.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  NewLineItem    │   │    LineItem     │   │   CartTotals    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id             │   │  item_count     │       │
//! │  │  title          │   │  title          │   │  total_quantity │       │
//! │  │  image_url      │   │  image_url      │   │  subtotal       │       │
//! │  │  price          │   │  price          │   └─────────────────┘       │
//! │  └─────────────────┘   │  quantity ≥ 1   │                             │
//! │   (add_to_cart input)  └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record Format
//! Field names are part of the persisted record and must not be renamed:
//! `id`, `title`, `image_url`, `price`, `quantity`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart, with its own quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product identifier, unique within the cart.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Product image shown next to the line.
    pub image_url: String,

    /// Unit price.
    pub price: f64,

    /// Number of units. Always at least 1 while the line exists.
    pub quantity: u32,
}

impl LineItem {
    /// Line total (unit price × quantity).
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

// =============================================================================
// New Line Item
// =============================================================================

/// A line item without its quantity: the input of `add_to_cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewLineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turns the input into a fresh cart line with quantity 1.
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct lines.
    pub item_count: u32,

    /// Sum of all quantities.
    pub total_quantity: u64,

    /// Sum of `price × quantity` over all lines.
    pub subtotal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = LineItem {
            id: "A".to_string(),
            title: "Apple".to_string(),
            image_url: "u".to_string(),
            price: 1.5,
            quantity: 4,
        };
        assert_eq!(item.line_total(), 6.0);
    }

    #[test]
    fn test_new_item_starts_at_one() {
        let item = NewLineItem::new("A", "Apple", "u", 1.5).into_line_item();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id, "A");
        assert_eq!(item.price, 1.5);
    }

    #[test]
    fn test_record_field_names() {
        let item = NewLineItem::new("A", "Apple", "https://img/a.png", 2.0).into_line_item();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "A");
        assert_eq!(json["title"], "Apple");
        assert_eq!(json["image_url"], "https://img/a.png");
        assert_eq!(json["price"], 2.0);
        assert_eq!(json["quantity"], 1);
    }
}
