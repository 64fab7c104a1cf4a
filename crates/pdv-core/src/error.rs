//! # Error Types
//!
//! Domain-specific error types for pdv-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pdv-core errors (this file)                                           │
//! │  ├── CoreError        - Precondition / state machine failures          │
//! │  └── ValidationError  - Input rejected, caller must re-prompt          │
//! │                                                                         │
//! │  pdv-db errors (separate crate)                                        │
//! │  └── DbError          - Snapshot persistence failures                  │
//! │                                                                         │
//! │  pdv-client errors (separate crate)                                    │
//! │  └── ClientError      - Backend call failures (become fallbacks)       │
//! │                                                                         │
//! │  Terminal app                                                          │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation that returns one of these errors has left the session
//! untouched.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Finalize attempted while part of the total is still unpaid.
    ///
    /// ## User Workflow
    /// ```text
    /// Total R$ 30.00, paid R$ 20.00
    ///      │
    ///      ▼
    /// finalize_sale()
    ///      │
    ///      ▼
    /// IncompletePayment { remaining: R$ 10.00 }
    ///      │
    ///      ▼
    /// UI shows: "Pagamento incompleto - falta R$ 10.00"
    /// ```
    #[error("Incomplete payment: {remaining} remaining")]
    IncompletePayment { remaining: Money },

    /// Finalize attempted with nothing to sell.
    #[error("Cart is empty")]
    EmptyCart,

    /// Line item id not present in the active cart.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),

    /// Payment id not present in the current sale.
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Pending sale correlation id unknown.
    #[error("Pending sale not found: {0}")]
    PendingSaleNotFound(String),

    /// Discount request was already approved or rejected.
    ///
    /// Approved and rejected are terminal; a new request must be created.
    #[error("Discount request {id} is already {status}")]
    DiscountAlreadyResolved { id: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value exceeds the accepted maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (unparseable amount, unknown method, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
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
        let err = CoreError::IncompletePayment {
            remaining: Money::from_cents(1000),
        };
        assert_eq!(err.to_string(), "Incomplete payment: R$ 10.00 remaining");

        let err = CoreError::DiscountAlreadyResolved {
            id: "disc-1".to_string(),
            status: "approved".to_string(),
        };
        assert_eq!(err.to_string(), "Discount request disc-1 is already approved");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        };
        assert_eq!(err.to_string(), "payment amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
