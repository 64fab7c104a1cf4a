//! # Totals
//!
//! Sale totals computed from line items.
//!
//! ```text
//! subtotal       = Σ unit_price × quantity
//! discount_total = Σ discount_per_unit × quantity
//! total          = max(subtotal − discount_total, 0)
//! ```
//!
//! Totals are never stored. Every read recomputes them from the cart, so
//! they can't go stale after a quantity edit or a discount approval.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::LineItem;

/// Subtotal, discounts and net total of a set of line items.
///
/// Only `total` is clamped; `discount_total` may exceed `subtotal` and is
/// reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub discount_total: Money,
    pub total: Money,
}

/// Computes [`Totals`] for an ordered sequence of line items.
///
/// ## Example
/// ```rust
/// use pdv_core::money::Money;
/// use pdv_core::totals::calculate_totals;
/// use pdv_core::types::LineItem;
///
/// let items = vec![LineItem {
///     id: "item-1".into(),
///     code: "A".into(),
///     name: "Arroz".into(),
///     unit_price: Money::from_cents(1000),
///     quantity: 3,
///     discount_per_unit: Money::zero(),
/// }];
///
/// let totals = calculate_totals(&items);
/// assert_eq!(totals.total.cents(), 3000);
/// ```
pub fn calculate_totals(items: &[LineItem]) -> Totals {
    let subtotal: Money = items.iter().map(LineItem::gross).sum();
    let discount_total: Money = items.iter().map(LineItem::discount).sum();

    Totals {
        subtotal,
        discount_total,
        total: (subtotal - discount_total).non_negative(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, qty: i64, discount: i64) -> LineItem {
        LineItem {
            id: crate::types::new_id("item"),
            code: "X".to_string(),
            name: "X".to_string(),
            unit_price: Money::from_cents(price),
            quantity: qty,
            discount_per_unit: Money::from_cents(discount),
        }
    }

    #[test]
    fn test_empty_cart_is_zero() {
        assert_eq!(calculate_totals(&[]), Totals::default());
    }

    #[test]
    fn test_single_item_without_discount() {
        let totals = calculate_totals(&[item(1000, 3, 0)]);
        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.discount_total.cents(), 0);
        assert_eq!(totals.total.cents(), 3000);
    }

    #[test]
    fn test_two_items_with_discount() {
        let totals = calculate_totals(&[item(500, 2, 0), item(2000, 1, 200)]);
        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.discount_total.cents(), 200);
        assert_eq!(totals.total.cents(), 2800);
    }

    #[test]
    fn test_discount_larger_than_price_clamps_only_total() {
        let totals = calculate_totals(&[item(500, 2, 900)]);
        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.discount_total.cents(), 1800);
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_zero_quantity_line_is_inert() {
        let totals = calculate_totals(&[item(999, 0, 100), item(100, 1, 0)]);
        assert_eq!(totals.subtotal.cents(), 100);
        assert_eq!(totals.discount_total.cents(), 0);
        assert_eq!(totals.total.cents(), 100);
    }

    #[test]
    fn test_total_identity_holds_across_mixed_carts() {
        let carts = vec![
            vec![item(0, 5, 0)],
            vec![item(100, 1, 100), item(250, 4, 10)],
            vec![item(1, 1, 2), item(3, 3, 0), item(7000, 2, 6999)],
            vec![item(1999, 12, 2500)],
        ];

        for cart in carts {
            let totals = calculate_totals(&cart);
            let expected = (totals.subtotal - totals.discount_total).non_negative();
            assert_eq!(totals.total, expected);
            assert!(!totals.total.is_negative());
        }
    }

    #[test]
    fn test_largest_accepted_line_is_exact() {
        let line = item(crate::MAX_AMOUNT_CENTS, crate::MAX_QUANTITY, 0);
        let totals = calculate_totals(&[line.clone(), line]);

        assert_eq!(
            totals.subtotal.cents(),
            2 * crate::MAX_AMOUNT_CENTS * crate::MAX_QUANTITY
        );
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_overflowing_lines_saturate() {
        let totals = calculate_totals(&[item(1000, i64::MAX / 500, 0), item(1, 1, 0)]);
        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert_eq!(totals.total.cents(), i64::MAX);

        let totals = calculate_totals(&[item(1000, i64::MAX / 500, 1000)]);
        assert_eq!(totals.discount_total.cents(), i64::MAX);
        assert_eq!(totals.total, Money::zero());
    }
}
