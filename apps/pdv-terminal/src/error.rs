//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the PDV                                │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── no operator / missing capability ─► PERMISSION_DENIED       │
//! │         ├── ValidationError ("amount must be positive") ─► VALIDATION   │
//! │         ├── CoreError::IncompletePayment ─────────────► PAYMENT_ERROR   │
//! │         ├── DbError::QueryFailed ─────────────────────► DATABASE_ERROR  │
//! │         └── Ok(response)                                                │
//! │                                                                         │
//! │  The command loop prints `message` and keeps running.                   │
//! │                                                                         │
//! │  Backend failures never reach here: they come back as                   │
//! │  RemoteOutcome::Fallback and are reported as warnings.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pdv_core::{CoreError, ValidationError};
use pdv_db::DbError;
use serde::Serialize;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PAYMENT_ERROR",
///   "message": "Incomplete payment: R$ 10.00 remaining"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule refused the operation
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Payment incomplete or invalid
    PaymentError,

    /// No operator logged in
    Unauthenticated,

    /// Operator's role lacks the capability
    PermissionDenied,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    /// Creates the error for commands run with nobody logged in.
    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "No operator logged in")
    }

    /// Creates a permission error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PermissionDenied, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Session snapshot encoding failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Could not save session")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IncompletePayment { remaining } => ApiError::new(
                ErrorCode::PaymentError,
                format!("Incomplete payment: {} remaining", remaining),
            ),
            CoreError::EmptyCart => ApiError::cart("Cart is empty"),
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::PaymentNotFound(id) => ApiError::not_found("Payment", &id),
            CoreError::PendingSaleNotFound(id) => ApiError::not_found("Pending sale", &id),
            CoreError::DiscountAlreadyResolved { id, status } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Discount request {} is already {}", id, status),
            ),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
