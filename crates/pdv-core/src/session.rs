//! # PDV Session
//!
//! The aggregate every command operates on: cash drawer, cart, customer,
//! payments, pending-sale queue and discount requests.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  login ──► SessionStore::load_or_default() ──► PdvSession              │
//! │                                                    │                    │
//! │       ┌────────────────────────────────────────────┤                    │
//! │       │  open_cash ─► add_item ─► add_payment ─► finalize_sale          │
//! │       │       ▲                                        │                │
//! │       │       └──────── next sale ◄── clear_sale ◄─────┘                │
//! │       │                                                                 │
//! │       │  close_cash ─► Closed + clear_sale                             │
//! │       ▼                                                                 │
//! │  (after each committed command) SessionStore::save()                   │
//! │                                                                         │
//! │  logout ──► SessionStore::save() ──► session dropped                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Every method takes `&mut self` and either applies completely or returns an
//! error before touching anything. Persistence and network calls happen
//! outside, in the app layer.
//!
//! ## Audit State
//! Pending sales and discount requests survive `clear_sale` and `close_cash`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::cart::{Cart, NewLineItem};
use crate::cash::CashSession;
use crate::discount::{ApprovalOutcome, DiscountRequests};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::Payments;
use crate::totals::Totals;
use crate::types::{
    new_id, Customer, PaymentMethod, PaymentStatus, PendingSale, PendingSaleStatus,
    SaleSubmission, SubmittedItem,
};
use crate::validation::ValidationResult;

/// Result of a successful [`PdvSession::finalize_sale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedSale {
    /// Payload for the sales-recording backend.
    pub submission: SaleSubmission,
    /// Queue entry appended for reconciliation.
    pub pending_sale: PendingSale,
}

/// One operator's PDV state. Serialized as a single snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdvSession {
    cash: CashSession,
    cart: Cart,
    customer: Option<Customer>,
    payments: Payments,
    pending_sales: Vec<PendingSale>,
    discount_requests: DiscountRequests,
    offline: bool,
}

impl PdvSession {
    /// Fresh session: drawer closed, everything empty.
    pub fn new() -> Self {
        PdvSession::default()
    }

    // =========================================================================
    // Cash Drawer
    // =========================================================================

    pub fn open_cash(&mut self, opening_amount: Money) -> ValidationResult<()> {
        self.cash.open(opening_amount)?;
        debug!(opening_amount = %opening_amount, "Cash opened");
        Ok(())
    }

    /// Closes the drawer and resets the sale in progress.
    pub fn close_cash(&mut self) {
        self.cash.close();
        self.clear_sale();
        debug!(pending_sales = self.pending_sales.len(), "Cash closed");
    }

    pub fn cash(&self) -> &CashSession {
        &self.cash
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_item(&mut self, input: NewLineItem) -> ValidationResult<String> {
        self.cart.add_item(input)
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        self.cart.remove_item(item_id)
    }

    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> ValidationResult<bool> {
        self.cart.update_quantity(item_id, quantity)
    }

    /// Sets a line's discount directly, bypassing the approval workflow.
    pub fn apply_discount(&mut self, item_id: &str, per_unit: Money) -> ValidationResult<bool> {
        self.cart.apply_discount(item_id, per_unit)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Empties cart, payments and customer. The drawer stays as it is.
    pub fn clear_sale(&mut self) {
        self.cart.clear();
        self.payments.clear();
        self.customer = None;
    }

    pub fn set_customer(&mut self, customer: Option<Customer>) {
        self.customer = customer;
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    // =========================================================================
    // Discounts
    // =========================================================================

    pub fn request_discount(
        &mut self,
        item_id: &str,
        per_unit: Money,
        requested_by: &str,
    ) -> ValidationResult<String> {
        self.discount_requests.request(item_id, per_unit, requested_by)
    }

    pub fn approve_discount(
        &mut self,
        request_id: &str,
        approved_by: &str,
    ) -> CoreResult<ApprovalOutcome> {
        self.discount_requests
            .approve(&mut self.cart, request_id, approved_by)
    }

    pub fn reject_discount(&mut self, request_id: &str, rejected_by: &str) -> CoreResult<bool> {
        self.discount_requests.reject(request_id, rejected_by)
    }

    pub fn discount_requests(&self) -> &DiscountRequests {
        &self.discount_requests
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment, freezing its change against the current balance.
    ///
    /// `change = max(amount − remaining_before, 0)`
    pub fn add_payment(&mut self, method: PaymentMethod, amount: Money) -> ValidationResult<String> {
        let change = (amount - self.remaining()).non_negative();
        self.payments.add(method, amount, change)
    }

    pub fn set_payment_status(&mut self, payment_id: &str, status: PaymentStatus) -> CoreResult<()> {
        self.payments.set_status(payment_id, status)
    }

    pub fn payments(&self) -> &Payments {
        &self.payments
    }

    /// `max(total − paid, 0)` for the sale in progress.
    pub fn remaining(&self) -> Money {
        self.payments.remaining(self.totals().total)
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    /// Closes the sale in progress.
    ///
    /// ## Errors
    /// - `EmptyCart`: no lines to sell
    /// - `IncompletePayment`: part of the total is still unpaid
    ///
    /// On success a pending sale is queued and the sale is cleared, in one
    /// step. Submitting the returned payload is the caller's job.
    pub fn finalize_sale(&mut self) -> CoreResult<FinalizedSale> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let remaining = self.remaining();
        if !remaining.is_zero() {
            return Err(CoreError::IncompletePayment { remaining });
        }

        let total = self.totals().total;
        let sale_uid = Uuid::new_v4().to_string();

        let submission = SaleSubmission {
            sale_uid: sale_uid.clone(),
            items: self.cart.items().iter().map(SubmittedItem::from).collect(),
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            total,
        };

        let pending_sale = PendingSale {
            id: new_id("sale"),
            sale_uid,
            total,
            created_at: Utc::now(),
            status: PendingSaleStatus::Pending,
        };

        self.pending_sales.push(pending_sale.clone());
        self.clear_sale();

        debug!(
            sale_uid = %pending_sale.sale_uid,
            total = %total,
            items = submission.items.len(),
            "Sale finalized"
        );

        Ok(FinalizedSale {
            submission,
            pending_sale,
        })
    }

    /// Updates a queued sale's status during reconciliation.
    pub fn mark_pending_sale(&mut self, sale_uid: &str, status: PendingSaleStatus) -> CoreResult<()> {
        let sale = self
            .pending_sales
            .iter_mut()
            .find(|s| s.sale_uid == sale_uid)
            .ok_or_else(|| CoreError::PendingSaleNotFound(sale_uid.to_string()))?;

        sale.status = status;
        Ok(())
    }

    pub fn pending_sales(&self) -> &[PendingSale] {
        &self.pending_sales
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::DiscountStatus;

    fn line(code: &str, price: i64, qty: i64) -> NewLineItem {
        NewLineItem {
            code: code.to_string(),
            name: format!("Produto {}", code),
            unit_price: Money::from_cents(price),
            quantity: qty,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: "123.456.789-00".to_string(),
            name: "Maria".to_string(),
            document: Some("123.456.789-00".to_string()),
        }
    }

    #[test]
    fn test_single_item_sale_end_to_end() {
        let mut session = PdvSession::new();
        session.open_cash(Money::from_cents(10000)).unwrap();
        session.add_item(line("A", 1000, 3)).unwrap();

        let totals = session.totals();
        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.discount_total, Money::zero());
        assert_eq!(totals.total.cents(), 3000);

        session.add_payment(PaymentMethod::Cash, Money::from_cents(3000)).unwrap();
        assert_eq!(session.remaining(), Money::zero());

        let finalized = session.finalize_sale().unwrap();

        assert!(session.cart().is_empty());
        assert!(session.payments().is_empty());
        assert_eq!(session.pending_sales().len(), 1);
        assert_eq!(session.pending_sales()[0].total.cents(), 3000);
        assert_eq!(session.pending_sales()[0].status, PendingSaleStatus::Pending);
        assert_eq!(finalized.submission.total.cents(), 3000);
        assert_eq!(finalized.submission.sale_uid, finalized.pending_sale.sale_uid);
        assert!(session.cash().is_open());
    }

    #[test]
    fn test_two_item_cart_with_discount() {
        let mut session = PdvSession::new();
        session.add_item(line("A", 500, 2)).unwrap();
        let b = session.add_item(line("B", 2000, 1)).unwrap();
        session.apply_discount(&b, Money::from_cents(200)).unwrap();

        let totals = session.totals();
        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.discount_total.cents(), 200);
        assert_eq!(totals.total.cents(), 2800);
    }

    #[test]
    fn test_change_is_frozen_at_entry() {
        let mut session = PdvSession::new();
        let id = session.add_item(line("A", 1000, 3)).unwrap();

        session.add_payment(PaymentMethod::Pix, Money::from_cents(2000)).unwrap();
        let cash = session.add_payment(PaymentMethod::Cash, Money::from_cents(1500)).unwrap();
        assert_eq!(session.payments().get(&cash).unwrap().change.cents(), 500);

        // Cart grows afterwards; recorded change is not recomputed
        session.update_quantity(&id, 5).unwrap();
        assert_eq!(session.payments().get(&cash).unwrap().change.cents(), 500);
        assert_eq!(session.remaining().cents(), 1500);
    }

    #[test]
    fn test_finalize_with_remaining_never_mutates() {
        let mut session = PdvSession::new();
        session.add_item(line("A", 1000, 3)).unwrap();
        session.set_customer(Some(customer()));
        session.add_payment(PaymentMethod::Card, Money::from_cents(2000)).unwrap();
        let before = session.clone();

        let err = session.finalize_sale().unwrap_err();

        match err {
            CoreError::IncompletePayment { remaining } => assert_eq!(remaining.cents(), 1000),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(session, before);
    }

    #[test]
    fn test_finalize_empty_cart_is_refused() {
        let mut session = PdvSession::new();
        assert!(matches!(session.finalize_sale(), Err(CoreError::EmptyCart)));
        assert!(session.pending_sales().is_empty());
    }

    #[test]
    fn test_finalize_carries_customer_and_items() {
        let mut session = PdvSession::new();
        let id = session.add_item(line("789", 1000, 2)).unwrap();
        session.apply_discount(&id, Money::from_cents(100)).unwrap();
        session.set_customer(Some(customer()));
        session.add_payment(PaymentMethod::Pix, Money::from_cents(1800)).unwrap();

        let finalized = session.finalize_sale().unwrap();

        assert_eq!(finalized.submission.customer_id.as_deref(), Some("123.456.789-00"));
        assert_eq!(finalized.submission.items.len(), 1);
        assert_eq!(finalized.submission.items[0].product_id, "789");
        assert_eq!(finalized.submission.items[0].discount, Some(Money::from_cents(100)));
        assert!(session.customer().is_none());
    }

    #[test]
    fn test_overpaid_sale_can_be_finalized() {
        let mut session = PdvSession::new();
        session.add_item(line("A", 999, 1)).unwrap();
        session.add_payment(PaymentMethod::Cash, Money::from_cents(5000)).unwrap();

        assert!(session.finalize_sale().is_ok());
        assert_eq!(session.pending_sales().len(), 1);
    }

    #[test]
    fn test_close_cash_resets_sale_but_keeps_audit_state() {
        let mut session = PdvSession::new();
        session.add_item(line("A", 1000, 1)).unwrap();
        session.add_payment(PaymentMethod::Cash, Money::from_cents(1000)).unwrap();
        session.finalize_sale().unwrap();

        session.open_cash(Money::from_cents(5000)).unwrap();
        let id = session.add_item(line("B", 700, 2)).unwrap();
        session.request_discount(&id, Money::from_cents(50), "ana").unwrap();
        session.set_customer(Some(customer()));
        session.add_payment(PaymentMethod::Pix, Money::from_cents(100)).unwrap();

        session.close_cash();

        assert!(!session.cash().is_open());
        assert_eq!(session.cash().opening_amount(), None);
        assert!(session.cart().is_empty());
        assert!(session.payments().is_empty());
        assert!(session.customer().is_none());
        assert_eq!(session.pending_sales().len(), 1);
        assert_eq!(session.discount_requests().len(), 1);
    }

    #[test]
    fn test_clear_sale_keeps_cash_open() {
        let mut session = PdvSession::new();
        session.open_cash(Money::from_cents(100)).unwrap();
        session.add_item(line("A", 100, 1)).unwrap();

        session.clear_sale();

        assert!(session.cart().is_empty());
        assert_eq!(session.cash().opening_amount(), Some(Money::from_cents(100)));
    }

    #[test]
    fn test_discount_approval_through_session() {
        let mut session = PdvSession::new();
        let id = session.add_item(line("A", 2000, 1)).unwrap();
        let first = session.request_discount(&id, Money::from_cents(200), "ana").unwrap();
        let second = session.request_discount(&id, Money::from_cents(500), "ana").unwrap();

        session.approve_discount(&first, "gerente").unwrap();

        assert_eq!(session.totals().total.cents(), 1800);
        let requests = session.discount_requests();
        assert_eq!(requests.get(&first).unwrap().status, DiscountStatus::Approved);
        assert_eq!(requests.get(&second).unwrap().status, DiscountStatus::Pending);

        session.reject_discount(&second, "gerente").unwrap();
        assert_eq!(session.totals().total.cents(), 1800);
    }

    #[test]
    fn test_mark_pending_sale() {
        let mut session = PdvSession::new();
        session.add_item(line("A", 100, 1)).unwrap();
        session.add_payment(PaymentMethod::Cash, Money::from_cents(100)).unwrap();
        let finalized = session.finalize_sale().unwrap();

        session
            .mark_pending_sale(&finalized.pending_sale.sale_uid, PendingSaleStatus::Failed)
            .unwrap();
        assert_eq!(session.pending_sales()[0].status, PendingSaleStatus::Failed);

        let err = session
            .mark_pending_sale("unknown", PendingSaleStatus::Failed)
            .unwrap_err();
        assert!(matches!(err, CoreError::PendingSaleNotFound(_)));
    }

    #[test]
    fn test_snapshot_round_trip_and_partial_snapshot() {
        let mut session = PdvSession::new();
        session.open_cash(Money::from_cents(2500)).unwrap();
        session.add_item(line("A", 350, 2)).unwrap();
        session.set_offline(true);

        let json = serde_json::to_string(&session).unwrap();
        let restored: PdvSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);

        let partial: PdvSession = serde_json::from_str(r#"{"offline": true}"#).unwrap();
        assert!(partial.is_offline());
        assert!(partial.cart().is_empty());
        assert!(!partial.cash().is_open());
    }

    #[test]
    fn test_oversized_quantity_never_reads_as_paid() {
        let mut session = PdvSession::new();
        session.open_cash(Money::zero()).unwrap();
        let id = session.add_item(line("A", 1000, 1)).unwrap();

        let err = session.update_quantity(&id, i64::MAX / 500).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(session.totals().total.cents(), 1000);

        let err = session.finalize_sale().unwrap_err();
        assert!(matches!(err, CoreError::IncompletePayment { .. }));
        assert_eq!(session.cart().len(), 1);
    }

    #[test]
    fn test_extreme_snapshot_values_saturate_instead_of_wrapping() {
        let mut session = PdvSession::new();
        session.open_cash(Money::zero()).unwrap();
        session.add_item(line("A", 1000, 1)).unwrap();

        // a snapshot edited outside the app skips input validation
        let mut json = serde_json::to_value(&session).unwrap();
        json["cart"][0]["quantity"] = serde_json::json!(i64::MAX / 500);
        let mut restored: PdvSession = serde_json::from_value(json).unwrap();

        let totals = restored.totals();
        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert_eq!(totals.total.cents(), i64::MAX);
        assert_eq!(restored.remaining().cents(), i64::MAX);

        let err = restored.finalize_sale().unwrap_err();
        assert!(matches!(err, CoreError::IncompletePayment { .. }));
        assert!(restored.pending_sales().is_empty());
    }
}
