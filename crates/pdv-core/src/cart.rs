//! # Cart
//!
//! Line items of the sale in progress.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action         Operation               Cart Change            │
//! │  ───────────────         ─────────               ───────────            │
//! │                                                                         │
//! │  Scan / type item ──────► add_item() ──────────► items.push(new line)  │
//! │                                                                         │
//! │  Edit quantity ─────────► update_quantity() ───► line.qty = max(q, 0)  │
//! │                                                                         │
//! │  Edit discount ─────────► apply_discount() ────► line.disc = max(d, 0) │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ───────► items.retain(..)      │
//! │                                                                         │
//! │  Finish / reset ────────► clear() ─────────────► items.clear()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are identified by their generated id, never by code
//! - Scanning the same code twice yields two lines (no merging)
//! - Quantity, unit price and discount are never negative
//! - Quantity is at most `MAX_QUANTITY`, price and discount at most
//!   `MAX_AMOUNT_CENTS`; larger input is refused without a change
//! - Zero-quantity lines stay in the list and contribute nothing to totals

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::totals::{calculate_totals, Totals};
use crate::types::{new_id, LineItem};
use crate::validation::{
    normalize_quantity, resolve_item_labels, validate_amount_limit, validate_quantity,
    ValidationResult,
};

/// Input for a new cart line, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

/// The active cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Appends a new line and returns its id.
    ///
    /// ## Behavior
    /// - Quantity below 1 is coerced to 1
    /// - Negative unit price is clamped to 0
    /// - Missing code/name defaults to the other; both missing is refused
    /// - Quantity or price above the limits is refused
    pub fn add_item(&mut self, input: NewLineItem) -> ValidationResult<String> {
        let (code, name) = resolve_item_labels(&input.code, &input.name)?;
        let quantity = normalize_quantity(input.quantity);
        let unit_price = input.unit_price.non_negative();
        validate_quantity(quantity)?;
        validate_amount_limit("unit price", unit_price)?;

        let item = LineItem {
            id: new_id("item"),
            code,
            name,
            unit_price,
            quantity,
            discount_per_unit: Money::zero(),
        };

        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Removes the line with the given id.
    ///
    /// Returns `false` when no such line exists; that is not an error.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != initial_len
    }

    /// Sets a line's quantity to `max(quantity, 0)`.
    ///
    /// Zero does not remove the line. Returns `Ok(false)` if the id is
    /// unknown.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> ValidationResult<bool> {
        let quantity = quantity.max(0);
        validate_quantity(quantity)?;

        Ok(match self.get_mut(id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        })
    }

    /// Sets a line's per-unit discount to `max(per_unit, 0)`.
    ///
    /// No permission check here: whoever calls this is already allowed to.
    /// Returns `Ok(false)` if the id is unknown.
    pub fn apply_discount(&mut self, id: &str, per_unit: Money) -> ValidationResult<bool> {
        let per_unit = per_unit.non_negative();
        validate_amount_limit("discount", per_unit)?;

        Ok(match self.get_mut(id) {
            Some(item) => {
                item.discount_per_unit = per_unit;
                true
            }
            None => false,
        })
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the line with the given id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the number of lines (including zero-quantity ones).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Recomputes the cart totals.
    pub fn totals(&self) -> Totals {
        calculate_totals(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::{MAX_AMOUNT_CENTS, MAX_QUANTITY};

    fn new_line(code: &str, price: i64, qty: i64) -> NewLineItem {
        NewLineItem {
            code: code.to_string(),
            name: format!("Produto {}", code),
            unit_price: Money::from_cents(price),
            quantity: qty,
        }
    }

    #[test]
    fn test_add_item_assigns_fresh_ids() {
        let mut cart = Cart::new();
        let a = cart.add_item(new_line("A", 1000, 3)).unwrap();
        let b = cart.add_item(new_line("A", 1000, 3)).unwrap();

        assert_ne!(a, b);
        assert_eq!(cart.len(), 2); // same code, two lines
        assert_eq!(cart.total_quantity(), 6);
        assert_eq!(cart.get(&a).unwrap().discount_per_unit, Money::zero());
    }

    #[test]
    fn test_add_item_coerces_quantity_and_price() {
        let mut cart = Cart::new();
        let id = cart.add_item(new_line("A", -500, 0)).unwrap();
        let item = cart.get(&id).unwrap();

        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price, Money::zero());
    }

    #[test]
    fn test_add_item_without_labels_is_refused() {
        let mut cart = Cart::new();
        let result = cart.add_item(NewLineItem {
            code: String::new(),
            name: " ".to_string(),
            unit_price: Money::from_cents(100),
            quantity: 1,
        });

        assert!(result.is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item_in_any_order_empties_cart() {
        let mut cart = Cart::new();
        let ids: Vec<String> = (0..5)
            .map(|n| cart.add_item(new_line(&n.to_string(), 100, 1)).unwrap())
            .collect();

        for idx in [3, 0, 4, 1, 2] {
            assert!(cart.remove_item(&ids[idx]));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unknown_item_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(new_line("A", 100, 1)).unwrap();

        assert!(!cart.remove_item("item-missing"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_clamps_and_keeps_line() {
        let mut cart = Cart::new();
        let id = cart.add_item(new_line("A", 1000, 3)).unwrap();

        assert!(cart.update_quantity(&id, -4).unwrap());
        assert_eq!(cart.get(&id).unwrap().quantity, 0);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().total, Money::zero());

        assert!(cart.update_quantity(&id, 7).unwrap());
        assert_eq!(cart.get(&id).unwrap().quantity, 7);
        assert!(!cart.update_quantity("item-missing", 2).unwrap());
    }

    #[test]
    fn test_apply_discount_clamps_negative() {
        let mut cart = Cart::new();
        let id = cart.add_item(new_line("A", 2000, 1)).unwrap();

        assert!(cart.apply_discount(&id, Money::from_cents(200)).unwrap());
        assert_eq!(cart.totals().total.cents(), 1800);

        assert!(cart.apply_discount(&id, Money::from_cents(-50)).unwrap());
        assert_eq!(cart.get(&id).unwrap().discount_per_unit, Money::zero());
    }

    #[test]
    fn test_oversized_quantity_is_refused_and_totals_stay_sane() {
        let mut cart = Cart::new();
        let id = cart.add_item(new_line("A", 1000, 1)).unwrap();

        let err = cart.update_quantity(&id, i64::MAX / 500).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(cart.get(&id).unwrap().quantity, 1);

        assert!(cart.update_quantity(&id, MAX_QUANTITY).unwrap());
        assert_eq!(cart.totals().total.cents(), 1000 * MAX_QUANTITY);
    }

    #[test]
    fn test_oversized_new_line_is_refused() {
        let mut cart = Cart::new();

        assert!(cart.add_item(new_line("A", 1000, MAX_QUANTITY + 1)).is_err());
        assert!(cart.add_item(new_line("A", MAX_AMOUNT_CENTS + 1, 1)).is_err());
        assert!(cart.is_empty());

        let id = cart
            .add_item(new_line("A", MAX_AMOUNT_CENTS, MAX_QUANTITY))
            .unwrap();
        let totals = cart.totals();
        assert_eq!(totals.subtotal.cents(), MAX_AMOUNT_CENTS * MAX_QUANTITY);
        assert!(totals.total.is_positive());

        assert!(cart.apply_discount(&id, Money::from_cents(i64::MAX)).is_err());
        assert_eq!(cart.get(&id).unwrap().discount_per_unit, Money::zero());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(new_line("A", 100, 2)).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals().total, Money::zero());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut cart = Cart::new();
        cart.add_item(new_line("A", 100, 2)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
