//! # Discount Approval Workflow
//!
//! Cashiers request a discount on a line; a manager approves or rejects it.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request() ──► ┌─────────┐ ── approve() ──► ┌──────────┐               │
//! │                │ PENDING │                   │ APPROVED │  (terminal)  │
//! │                └─────────┘ ── reject() ───► ┌──────────┐               │
//! │                                              │ REJECTED │  (terminal)  │
//! │                                              └──────────┘               │
//! │                                                                         │
//! │  approve() also writes request.per_unit into the referenced line's      │
//! │  discount_per_unit. Asking again means creating a new request.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests are kept after resolution as an audit trail, including across
//! cash closings. Several pending requests may target the same line; each is
//! decided independently and the latest approval wins.
//!
//! Nothing here checks who is calling. Approval rights are checked by the
//! caller against [`Permission::DiscountApprove`](crate::permission::Permission).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{new_id, DiscountRequest, DiscountStatus};
use crate::validation::{validate_discount_amount, validate_operator, ValidationResult};

/// What an approval attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The line's discount was set and the request marked approved.
    Applied { item_id: String, per_unit: Money },
    /// No request with that id; nothing changed.
    RequestNotFound,
    /// The referenced line is no longer in the cart; nothing changed and the
    /// request stays pending.
    ItemNotInCart { item_id: String },
}

/// All discount requests of the session, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountRequests {
    requests: Vec<DiscountRequest>,
}

impl DiscountRequests {
    /// Creates an empty request list.
    pub fn new() -> Self {
        DiscountRequests::default()
    }

    /// Records a new pending request and returns its id.
    ///
    /// The item is not required to be in the cart right now.
    pub fn request(
        &mut self,
        item_id: &str,
        per_unit: Money,
        requested_by: &str,
    ) -> ValidationResult<String> {
        validate_discount_amount(per_unit)?;
        validate_operator(requested_by)?;

        let request = DiscountRequest {
            id: new_id("disc"),
            item_id: item_id.to_string(),
            requested_by: requested_by.trim().to_string(),
            per_unit,
            status: DiscountStatus::Pending,
            created_at: Some(Utc::now()),
            resolved_at: None,
            resolved_by: None,
        };

        let id = request.id.clone();
        self.requests.push(request);
        Ok(id)
    }

    /// Approves a pending request and applies its value to the cart line.
    ///
    /// ## Behavior
    /// - Unknown request id: `RequestNotFound`, no change
    /// - Request already approved/rejected: `DiscountAlreadyResolved` error
    /// - Line gone from the cart: `ItemNotInCart`, warning logged, no change
    /// - Otherwise: line discount set, only this request marked approved
    pub fn approve(
        &mut self,
        cart: &mut Cart,
        request_id: &str,
        approved_by: &str,
    ) -> CoreResult<ApprovalOutcome> {
        let Some(request) = self.requests.iter_mut().find(|r| r.id == request_id) else {
            return Ok(ApprovalOutcome::RequestNotFound);
        };

        ensure_pending(request)?;

        if !cart.apply_discount(&request.item_id, request.per_unit)? {
            warn!(
                request_id = %request.id,
                item_id = %request.item_id,
                "Discount approval skipped: item no longer in cart"
            );
            return Ok(ApprovalOutcome::ItemNotInCart {
                item_id: request.item_id.clone(),
            });
        }

        request.status = DiscountStatus::Approved;
        request.resolved_at = Some(Utc::now());
        request.resolved_by = Some(approved_by.trim().to_string());

        Ok(ApprovalOutcome::Applied {
            item_id: request.item_id.clone(),
            per_unit: request.per_unit,
        })
    }

    /// Rejects a pending request. The cart is never touched.
    ///
    /// Returns `Ok(false)` when no request has that id.
    pub fn reject(&mut self, request_id: &str, rejected_by: &str) -> CoreResult<bool> {
        let Some(request) = self.requests.iter_mut().find(|r| r.id == request_id) else {
            return Ok(false);
        };

        ensure_pending(request)?;

        request.status = DiscountStatus::Rejected;
        request.resolved_at = Some(Utc::now());
        request.resolved_by = Some(rejected_by.trim().to_string());
        Ok(true)
    }

    /// Returns the request with the given id.
    pub fn get(&self, id: &str) -> Option<&DiscountRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Requests still waiting for a decision.
    pub fn pending(&self) -> impl Iterator<Item = &DiscountRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == DiscountStatus::Pending)
    }

    /// Every request ever made for a line, in creation order.
    pub fn for_item<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a DiscountRequest> {
        self.requests.iter().filter(move |r| r.item_id == item_id)
    }

    /// All requests, oldest first.
    pub fn all(&self) -> &[DiscountRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

fn ensure_pending(request: &DiscountRequest) -> CoreResult<()> {
    if request.status.is_terminal() {
        return Err(CoreError::DiscountAlreadyResolved {
            id: request.id.clone(),
            status: request.status.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::NewLineItem;

    fn cart_with_item(price: i64) -> (Cart, String) {
        let mut cart = Cart::new();
        let id = cart
            .add_item(NewLineItem {
                code: "789".to_string(),
                name: "Queijo".to_string(),
                unit_price: Money::from_cents(price),
                quantity: 2,
            })
            .unwrap();
        (cart, id)
    }

    #[test]
    fn test_request_rejects_non_positive_amount() {
        let mut requests = DiscountRequests::new();
        assert!(requests.request("item-1", Money::zero(), "ana").is_err());
        assert!(requests.request("item-1", Money::from_cents(-10), "ana").is_err());
        assert!(requests.request("item-1", Money::from_cents(10), " ").is_err());
        assert!(requests.is_empty());
    }

    #[test]
    fn test_request_does_not_require_item_in_cart() {
        let mut requests = DiscountRequests::new();
        let id = requests.request("item-ghost", Money::from_cents(100), "ana").unwrap();

        let request = requests.get(&id).unwrap();
        assert_eq!(request.status, DiscountStatus::Pending);
        assert!(request.created_at.is_some());
    }

    #[test]
    fn test_approve_applies_discount_and_leaves_siblings_pending() {
        let (mut cart, item_id) = cart_with_item(2000);
        let mut requests = DiscountRequests::new();
        let first = requests.request(&item_id, Money::from_cents(150), "ana").unwrap();
        let second = requests.request(&item_id, Money::from_cents(300), "ana").unwrap();

        let outcome = requests.approve(&mut cart, &first, "gerente").unwrap();

        assert_eq!(
            outcome,
            ApprovalOutcome::Applied {
                item_id: item_id.clone(),
                per_unit: Money::from_cents(150),
            }
        );
        assert_eq!(cart.get(&item_id).unwrap().discount_per_unit.cents(), 150);
        assert_eq!(requests.get(&first).unwrap().status, DiscountStatus::Approved);
        assert_eq!(requests.get(&first).unwrap().resolved_by.as_deref(), Some("gerente"));
        assert_eq!(requests.get(&second).unwrap().status, DiscountStatus::Pending);

        // A later sibling approval overwrites the discount
        requests.approve(&mut cart, &second, "gerente").unwrap();
        assert_eq!(cart.get(&item_id).unwrap().discount_per_unit.cents(), 300);
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn test_approve_unknown_request_is_noop() {
        let (mut cart, item_id) = cart_with_item(2000);
        let mut requests = DiscountRequests::new();

        let outcome = requests.approve(&mut cart, "disc-missing", "gerente").unwrap();

        assert_eq!(outcome, ApprovalOutcome::RequestNotFound);
        assert_eq!(cart.get(&item_id).unwrap().discount_per_unit, Money::zero());
    }

    #[test]
    fn test_approve_for_removed_item_keeps_request_pending() {
        let (mut cart, item_id) = cart_with_item(2000);
        let mut requests = DiscountRequests::new();
        let id = requests.request(&item_id, Money::from_cents(150), "ana").unwrap();
        cart.remove_item(&item_id);

        let outcome = requests.approve(&mut cart, &id, "gerente").unwrap();

        assert_eq!(outcome, ApprovalOutcome::ItemNotInCart { item_id });
        assert_eq!(requests.get(&id).unwrap().status, DiscountStatus::Pending);
        assert_eq!(requests.pending().count(), 1);
    }

    #[test]
    fn test_reject_leaves_cart_untouched() {
        let (mut cart, item_id) = cart_with_item(2000);
        let mut requests = DiscountRequests::new();
        let id = requests.request(&item_id, Money::from_cents(150), "ana").unwrap();

        assert!(requests.reject(&id, "gerente").unwrap());
        assert_eq!(requests.get(&id).unwrap().status, DiscountStatus::Rejected);
        assert_eq!(cart.get(&item_id).unwrap().discount_per_unit, Money::zero());
        assert!(!requests.reject("disc-missing", "gerente").unwrap());

        // Terminal: cannot be approved afterwards
        let err = requests.approve(&mut cart, &id, "gerente").unwrap_err();
        assert!(matches!(err, CoreError::DiscountAlreadyResolved { .. }));
        assert_eq!(cart.get(&item_id).unwrap().discount_per_unit, Money::zero());
    }

    #[test]
    fn test_approved_request_cannot_be_rejected() {
        let (mut cart, item_id) = cart_with_item(2000);
        let mut requests = DiscountRequests::new();
        let id = requests.request(&item_id, Money::from_cents(150), "ana").unwrap();
        requests.approve(&mut cart, &id, "gerente").unwrap();

        assert!(requests.reject(&id, "gerente").is_err());
        assert_eq!(requests.get(&id).unwrap().status, DiscountStatus::Approved);
    }

    #[test]
    fn test_for_item_lists_history() {
        let mut requests = DiscountRequests::new();
        requests.request("item-a", Money::from_cents(10), "ana").unwrap();
        requests.request("item-b", Money::from_cents(20), "ana").unwrap();
        requests.request("item-a", Money::from_cents(30), "bia").unwrap();

        let amounts: Vec<i64> = requests.for_item("item-a").map(|r| r.per_unit.cents()).collect();
        assert_eq!(amounts, vec![10, 30]);
    }
}
