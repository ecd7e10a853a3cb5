//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Cart rule violations, record decoding           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gomarket-storage errors (separate crate)                              │
//! │  └── StorageError     - Key-value store failures                       │
//! │                                                                         │
//! │  gomarket-cart errors                                                  │
//! │  └── CartError        - What cart consumers see                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → UI                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No line item with this id is in the cart.
    ///
    /// ## When This Occurs
    /// - `increment` / `decrement` called with an id that was never added
    /// - The item was already removed by an earlier decrement
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// Incrementing would overflow the quantity counter.
    #[error("Quantity for {id} cannot grow beyond {max}")]
    QuantityOverflow { id: String, max: u32 },

    /// The persisted record could not be encoded or decoded.
    #[error("Invalid cart record: {0}")]
    InvalidRecord(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidRecord(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a mutation runs, so a failed validation never leaves the
/// cart half-updated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least one.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., NaN price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two lines sharing an id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ItemNotFound("A".to_string());
        assert_eq!(err.to_string(), "Item not in cart: A");

        let err = CoreError::QuantityOverflow {
            id: "A".to_string(),
            max: u32::MAX,
        };
        assert_eq!(err.to_string(), "Quantity for A cannot grow beyond 4294967295");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "id is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_json_error_converts_to_invalid_record() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::InvalidRecord(_)));
    }
}
