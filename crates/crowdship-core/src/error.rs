//! # Error Types
//!
//! Domain-specific error types for crowdship-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crowdship-core errors (this file)                                     │
//! │  ├── CoreError        - Lifecycle / permission failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  crowdship-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, version conflicts            │
//! │                                                                         │
//! │  crowdship-app errors                                                  │
//! │  └── ApiError         - What the mobile shell shows the user           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order ID, field name, etc.)
//! 3. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::lifecycle::OrderAction;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by the order lifecycle and its permission checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No signed-in user for an operation that needs one.
    #[error("You must be logged in to perform this action")]
    Unauthenticated,

    /// Caller has the wrong role or does not own the order.
    ///
    /// ## When This Occurs
    /// - A sender tries to accept an order
    /// - A sender cancels somebody else's order
    /// - A partner cancels an order assigned to another partner
    #[error("{reason}")]
    Forbidden { reason: String },

    /// No order with this ID exists in the collection.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order's current status does not allow the requested action.
    ///
    /// ## When This Occurs
    /// - Accepting an order that is no longer pending
    /// - Cancelling a delivered or already cancelled order
    #[error("Order {order_id} is {status}, cannot {action}")]
    InvalidTransition {
        order_id: String,
        status: OrderStatus,
        action: OrderAction,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Forbidden error with the given user-facing reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state changes, so a failed validation never touches
/// the order collection or the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. an email without '@').
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not (password confirmation).
    #[error("{field} does not match")]
    Mismatch { field: String },

    /// A batch operation received nothing to do.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            order_id: "abc".to_string(),
            status: OrderStatus::Delivered,
            action: OrderAction::Accept,
        };
        assert_eq!(err.to_string(), "Order abc is delivered, cannot accept");

        let err = CoreError::OrderNotFound("xyz".to_string());
        assert_eq!(err.to_string(), "Order not found: xyz");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("email");
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::Mismatch {
            field: "password".to_string(),
        };
        assert_eq!(err.to_string(), "password does not match");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "name is required");
    }
}
