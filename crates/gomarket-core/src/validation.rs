//! # Validation Module
//!
//! Input validation for line items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile UI                                                    │
//! │  └── Only offers products from the catalogue                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart (Rust)                                                  │
//! │  ├── THIS MODULE: id / title / price checks before add_to_cart         │
//! │  └── Record checks on hydration (quantity ≥ 1, unique ids)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::{validate_item_id, validate_price};
//!
//! validate_item_id("apple-1").unwrap();
//! assert!(validate_price(f64::NAN).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::NewLineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a line item id. Any non-blank id is accepted.
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a line item title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number (no NaN / infinity)
/// - Must be non-negative; zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use gomarket_core::validation::validate_price;
///
/// assert!(validate_price(1.5).is_ok());
/// assert!(validate_price(0.0).is_ok());
/// assert!(validate_price(-0.01).is_err());
/// ```
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stored quantity. Lines with quantity 0 must not exist.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates everything `add_to_cart` accepts.
///
/// `image_url` is not checked: an empty image is rendered as a placeholder.
pub fn validate_new_item(item: &NewLineItem) -> ValidationResult<()> {
    validate_item_id(&item.id)?;
    validate_title(&item.title)?;
    validate_price(item.price)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("A").is_ok());
        assert!(validate_item_id("5f2b-apple").is_ok());

        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("   ").is_err());
        assert!(validate_item_id(&"A".repeat(1_000)).is_ok());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Apple").is_ok());
        assert_eq!(
            validate_title(""),
            Err(ValidationError::Required {
                field: "title".to_string()
            })
        );
        assert!(validate_title(&"Apple ".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(1099.99).is_ok());

        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(u32::MAX).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_validate_new_item_reports_first_problem() {
        let item = NewLineItem::new("", "", "", -1.0);
        assert_eq!(
            validate_new_item(&item),
            Err(ValidationError::Required {
                field: "id".to_string()
            })
        );

        let item = NewLineItem::new("A", "Apple", "", 1.5);
        assert!(validate_new_item(&item).is_ok());
    }
}
