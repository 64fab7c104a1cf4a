//! # Payment Accumulator
//!
//! Payment entries recorded against the running total of the sale.
//!
//! ## Split Tender
//! ```text
//! Total R$ 30.00
//!
//!   pay pix  R$ 20.00   remaining 10.00   change 0.00
//!   pay cash R$ 15.00   remaining  0.00   change 5.00  (frozen on the entry)
//!
//!   paid   = Σ amount            = 35.00
//!   remaining = max(total − paid, 0) = 0.00  ──► finalize allowed
//! ```
//!
//! Overpayment is accepted. The change on each entry is computed once, when
//! the entry is recorded, and never recalculated if the cart changes later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{new_id, PaymentEntry, PaymentMethod, PaymentStatus};
use crate::validation::{validate_change, validate_payment_amount, ValidationResult};

/// Payments of the sale in progress, in the order they were taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payments {
    entries: Vec<PaymentEntry>,
}

impl Payments {
    pub fn new() -> Self {
        Payments::default()
    }

    /// Records a pending payment and returns its id.
    ///
    /// `amount` must be positive and `change` non-negative.
    pub fn add(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        change: Money,
    ) -> ValidationResult<String> {
        validate_payment_amount(amount)?;
        validate_change(change)?;

        let entry = PaymentEntry {
            id: new_id("pay"),
            method,
            amount,
            change,
            status: PaymentStatus::Pending,
        };

        let id = entry.id.clone();
        self.entries.push(entry);
        Ok(id)
    }

    /// Records a status reported by the payment gateway.
    pub fn set_status(&mut self, payment_id: &str, status: PaymentStatus) -> CoreResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| CoreError::PaymentNotFound(payment_id.to_string()))?;

        entry.status = status;
        Ok(())
    }

    /// Sum of all amounts tendered.
    pub fn total_paid(&self) -> Money {
        self.entries.iter().map(|p| p.amount).sum()
    }

    /// Sum of the change frozen on each entry.
    pub fn total_change(&self) -> Money {
        self.entries.iter().map(|p| p.change).sum()
    }

    /// `max(total − paid, 0)`.
    pub fn remaining(&self, total: Money) -> Money {
        (total - self.total_paid()).non_negative()
    }

    /// Amount tendered per method; methods without payments are absent.
    pub fn by_method(&self) -> BTreeMap<PaymentMethod, Money> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.method).or_insert_with(Money::zero) += entry.amount;
        }
        totals
    }

    pub fn get(&self, payment_id: &str) -> Option<&PaymentEntry> {
        self.entries.iter().find(|p| p.id == payment_id)
    }

    pub fn entries(&self) -> &[PaymentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_invalid_amounts() {
        let mut payments = Payments::new();
        assert!(payments.add(PaymentMethod::Cash, Money::zero(), Money::zero()).is_err());
        assert!(payments
            .add(PaymentMethod::Cash, Money::from_cents(-100), Money::zero())
            .is_err());
        assert!(payments
            .add(PaymentMethod::Cash, Money::from_cents(100), Money::from_cents(-1))
            .is_err());
        assert!(payments.is_empty());
    }

    #[test]
    fn test_add_creates_pending_entry() {
        let mut payments = Payments::new();
        let id = payments
            .add(PaymentMethod::Card, Money::from_cents(1500), Money::zero())
            .unwrap();

        let entry = payments.get(&id).unwrap();
        assert!(id.starts_with("pay-"));
        assert_eq!(entry.status, PaymentStatus::Pending);
        assert_eq!(entry.method, PaymentMethod::Card);
    }

    #[test]
    fn test_remaining_and_overpayment() {
        let mut payments = Payments::new();
        let total = Money::from_cents(3000);

        payments.add(PaymentMethod::Pix, Money::from_cents(2000), Money::zero()).unwrap();
        assert_eq!(payments.remaining(total).cents(), 1000);

        payments
            .add(PaymentMethod::Cash, Money::from_cents(1500), Money::from_cents(500))
            .unwrap();
        assert_eq!(payments.remaining(total), Money::zero());
        assert_eq!(payments.total_paid().cents(), 3500);
        assert_eq!(payments.total_change().cents(), 500);
    }

    #[test]
    fn test_by_method_groups_amounts() {
        let mut payments = Payments::new();
        payments.add(PaymentMethod::Cash, Money::from_cents(100), Money::zero()).unwrap();
        payments.add(PaymentMethod::Pix, Money::from_cents(250), Money::zero()).unwrap();
        payments.add(PaymentMethod::Cash, Money::from_cents(300), Money::zero()).unwrap();

        let totals = payments.by_method();
        assert_eq!(totals.get(&PaymentMethod::Cash), Some(&Money::from_cents(400)));
        assert_eq!(totals.get(&PaymentMethod::Pix), Some(&Money::from_cents(250)));
        assert_eq!(totals.get(&PaymentMethod::Card), None);
    }

    #[test]
    fn test_set_status() {
        let mut payments = Payments::new();
        let id = payments.add(PaymentMethod::Card, Money::from_cents(100), Money::zero()).unwrap();

        payments.set_status(&id, PaymentStatus::Captured).unwrap();
        assert_eq!(payments.get(&id).unwrap().status, PaymentStatus::Captured);

        let err = payments.set_status("pay-missing", PaymentStatus::Failed).unwrap_err();
        assert!(matches!(err, CoreError::PaymentNotFound(_)));
    }
}
