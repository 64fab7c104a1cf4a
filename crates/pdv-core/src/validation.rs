//! # Validation Module
//!
//! Input validation for session operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input parsing (terminal / front-end)                         │
//! │  ├── Money::parse_decimal, PaymentMethod::from_str                     │
//! │  └── Immediate re-prompt on garbage                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rules (amount > 0, opening amount >= 0, ...)             │
//! │  └── Called by session operations before any mutation                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Clamping inside the cart                                     │
//! │  └── quantity >= 0, price >= 0, discount >= 0                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected input never mutates the session.
//!
//! ## Usage
//! ```rust
//! use pdv_core::money::Money;
//! use pdv_core::validation::{normalize_quantity, validate_payment_amount};
//!
//! assert_eq!(normalize_quantity(0), 1);
//! assert!(validate_payment_amount(Money::from_cents(3000)).is_ok());
//! assert!(validate_payment_amount(Money::zero()).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_CENTS, MAX_CODE_LEN, MAX_NAME_LEN, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Resolves the code/name pair typed for a new cart line.
///
/// ## Rules
/// - At least one of code or name must be non-empty
/// - A missing code defaults to the name, a missing name to the code
/// - Code at most 50 characters, name at most 200
///
/// ## Example
/// ```rust
/// use pdv_core::validation::resolve_item_labels;
///
/// let (code, name) = resolve_item_labels("", "Pao frances").unwrap();
/// assert_eq!(code, "Pao frances");
/// assert_eq!(name, "Pao frances");
/// assert!(resolve_item_labels(" ", "").is_err());
/// ```
pub fn resolve_item_labels(code: &str, name: &str) -> ValidationResult<(String, String)> {
    let code = code.trim();
    let name = name.trim();

    let (code, name) = match (code.is_empty(), name.is_empty()) {
        (true, true) => {
            return Err(ValidationError::Required {
                field: "code or name".to_string(),
            })
        }
        (true, false) => (name, name),
        (false, true) => (code, code),
        (false, false) => (code, name),
    };

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok((code.to_string(), name.to_string()))
}

/// Validates the operator name attached to a discount request or decision.
pub fn validate_operator(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "operator".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Coerces a requested quantity for a new line to at least 1.
///
/// Adding zero or a negative quantity is almost always a typo on the
/// quantity field, so the line is added with one unit instead of refused.
#[inline]
pub fn normalize_quantity(qty: i64) -> i64 {
    qty.max(1)
}

/// Validates a line quantity against [`MAX_QUANTITY`].
///
/// Callers clamp or coerce the lower end first.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty > MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates that an amount stays within [`MAX_AMOUNT_CENTS`].
///
/// Together with [`validate_quantity`] this keeps every line total, and any
/// realistic cart total, far inside the `i64` range.
pub fn validate_amount_limit(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS).to_string(),
        });
    }

    Ok(())
}

/// Validates a cash opening amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (drawer opened empty)
pub fn validate_opening_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
/// - At most [`MAX_AMOUNT_CENTS`]
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    validate_amount_limit("payment amount", amount)
}

/// Validates the change recorded alongside a payment (>= 0).
pub fn validate_change(change: Money) -> ValidationResult<()> {
    if change.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "change".to_string(),
        });
    }

    Ok(())
}

/// Validates the per-unit amount of a discount request.
///
/// ## Rules
/// - Must be positive (> 0); a zero discount is not worth a manager's time
pub fn validate_discount_amount(per_unit: Money) -> ValidationResult<()> {
    if !per_unit.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "discount".to_string(),
        });
    }

    validate_amount_limit("discount", per_unit)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_item_labels() {
        assert_eq!(
            resolve_item_labels("789", "Leite").unwrap(),
            ("789".to_string(), "Leite".to_string())
        );
        assert_eq!(
            resolve_item_labels("789", "  ").unwrap(),
            ("789".to_string(), "789".to_string())
        );
        assert!(resolve_item_labels("", "").is_err());
        assert!(resolve_item_labels(&"9".repeat(51), "Leite").is_err());
        assert!(resolve_item_labels("789", &"L".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_operator() {
        assert!(validate_operator("gerente").is_ok());
        assert!(validate_operator("  ").is_err());
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize_quantity(5), 5);
        assert_eq!(normalize_quantity(1), 1);
        assert_eq!(normalize_quantity(0), 1);
        assert_eq!(normalize_quantity(-3), 1);
    }

    #[test]
    fn test_validate_opening_amount() {
        assert!(validate_opening_amount(Money::zero()).is_ok());
        assert!(validate_opening_amount(Money::from_cents(10000)).is_ok());
        assert!(validate_opening_amount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_cents(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_cents(-100)).is_err());
        assert!(validate_payment_amount(Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(validate_payment_amount(Money::from_cents(MAX_AMOUNT_CENTS + 1)).is_err());
    }

    #[test]
    fn test_validate_change() {
        assert!(validate_change(Money::zero()).is_ok());
        assert!(validate_change(Money::from_cents(-5)).is_err());
    }

    #[test]
    fn test_validate_discount_amount() {
        assert!(validate_discount_amount(Money::from_cents(150)).is_ok());
        assert!(validate_discount_amount(Money::zero()).is_err());
        assert!(validate_discount_amount(Money::from_cents(-150)).is_err());
        assert!(validate_discount_amount(Money::from_cents(i64::MAX)).is_err());
    }

    #[test]
    fn test_validate_quantity_upper_bound() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(validate_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_amount_limit() {
        assert!(validate_amount_limit("price", Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        let err = validate_amount_limit("price", Money::from_cents(MAX_AMOUNT_CENTS + 1)).unwrap_err();
        assert_eq!(err.to_string(), "price must be at most R$ 10000000.00");
    }
}
