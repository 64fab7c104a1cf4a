//! # Domain Types
//!
//! Records owned by a PDV session.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │  PaymentEntry   │   │  PendingSale    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id  item-…     │   │  id  pay-…      │   │  id  sale-…     │       │
//! │  │  code (business)│   │  method         │   │  sale_uid       │       │
//! │  │  unit_price     │   │  amount         │   │  total          │       │
//! │  │  quantity       │   │  change         │   │  status         │       │
//! │  │  discount/unit  │   │  status         │   │                 │       │
//! │  └────────▲────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │ item_id (lookup only)                                       │
//! │  ┌────────┴────────┐   ┌─────────────────┐                             │
//! │  │ DiscountRequest │   │    Customer     │  copy, display only         │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record carries a generated `<prefix>-<uuid v4>` id. A line item's
//! `code` is a business identifier only: the same code may appear on
//! several lines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

/// Generates a unique record id such as `item-550e8400-e29b-...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

// =============================================================================
// Payment Method
// =============================================================================

/// Tender types accepted at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Pix instant transfer.
    Pix,
}

impl PaymentMethod {
    /// All methods, in display order.
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Pix];

    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartao",
            PaymentMethod::Pix => "Pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "card" | "cartao" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Status of a payment entry as reported by the payment gateway.
///
/// Entries are always created as `Pending`; the core only records later
/// statuses, it never drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Captured,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Reconciliation status of a locally recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PendingSaleStatus {
    /// Awaiting backend confirmation.
    #[default]
    Pending,
    /// Marked failed by reconciliation.
    Failed,
}

impl FromStr for PendingSaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PendingSaleStatus::Pending),
            "failed" => Ok(PendingSaleStatus::Failed),
            _ => Err(ValidationError::NotAllowed {
                field: "pending sale status".to_string(),
                allowed: vec!["pending".to_string(), "failed".to_string()],
            }),
        }
    }
}

/// Lifecycle of a discount request: `Pending → Approved | Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DiscountStatus {
    /// Approved and rejected requests can never transition again.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, DiscountStatus::Pending)
    }
}

impl fmt::Display for DiscountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscountStatus::Pending => "pending",
            DiscountStatus::Approved => "approved",
            DiscountStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Open/closed flag of the cash drawer, as shown to operators and
/// exchanged with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashStatus {
    #[default]
    Closed,
    Open,
}

impl fmt::Display for CashStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashStatus::Closed => write!(f, "closed"),
            CashStatus::Open => write!(f, "open"),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer attached to the current sale.
///
/// A copy of the identifying fields, not a live link to the customer
/// registry. Used for display and for `customer_id` on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// CPF/CNPJ.
    pub document: Option<String>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of the active cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Generated id (`item-<uuid>`); the line's identity.
    pub id: String,
    /// Product code or SKU as scanned/typed. Not unique within a cart.
    pub code: String,
    pub name: String,
    /// Unit price, never negative.
    pub unit_price: Money,
    /// Quantity, never negative. Zero keeps the line but makes it inert.
    pub quantity: i64,
    /// Discount amount per unit, never negative.
    #[serde(default)]
    pub discount_per_unit: Money,
}

impl LineItem {
    /// `unit_price × quantity`.
    #[inline]
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// `discount_per_unit × quantity`.
    #[inline]
    pub fn discount(&self) -> Money {
        self.discount_per_unit.multiply_quantity(self.quantity)
    }

    /// Line value after discount, floored at zero for display.
    #[inline]
    pub fn net(&self) -> Money {
        (self.gross() - self.discount()).non_negative()
    }
}

// =============================================================================
// Payment Entry
// =============================================================================

/// A payment towards the current sale.
/// A sale can have several entries for split tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentEntry {
    pub id: String,
    pub method: PaymentMethod,
    /// Amount tendered, always positive.
    pub amount: Money,
    /// Change owed for this entry, frozen when the entry was recorded.
    #[serde(default)]
    pub change: Money,
    pub status: PaymentStatus,
}

// =============================================================================
// Pending Sale
// =============================================================================

/// A sale recorded locally, awaiting backend confirmation.
///
/// Entries are never deleted by the core, only status-updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingSale {
    pub id: String,
    /// Idempotency key sent with the submission.
    pub sale_uid: String,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub status: PendingSaleStatus,
}

// =============================================================================
// Discount Request
// =============================================================================

/// A cashier-initiated discount override awaiting manager decision.
///
/// `per_unit` is a currency amount per unit, applied verbatim to the line's
/// `discount_per_unit` on approval. Older snapshots stored the same value
/// under `percent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRequest {
    pub id: String,
    /// Weak reference to a line item; resolved by lookup at approval time.
    pub item_id: String,
    /// Id of the operator who asked; `resolved_by` uses the same ids.
    pub requested_by: String,
    #[serde(alias = "percent")]
    pub per_unit: Money,
    pub status: DiscountStatus,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
}

// =============================================================================
// Sale Submission
// =============================================================================

/// Payload handed to the sales-recording backend when a sale is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleSubmission {
    pub sale_uid: String,
    pub items: Vec<SubmittedItem>,
    pub customer_id: Option<String>,
    pub total: Money,
}

/// Line snapshot inside a [`SaleSubmission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedItem {
    /// The line's code; the backend resolves it to a product.
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
}

impl From<&LineItem> for SubmittedItem {
    fn from(item: &LineItem) -> Self {
        SubmittedItem {
            product_id: item.code.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: (!item.discount_per_unit.is_zero()).then_some(item.discount_per_unit),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64, discount: i64) -> LineItem {
        LineItem {
            id: new_id("item"),
            code: "7891000100103".to_string(),
            name: "Cafe 500g".to_string(),
            unit_price: Money::from_cents(price),
            quantity: qty,
            discount_per_unit: Money::from_cents(discount),
        }
    }

    #[test]
    fn test_new_id_has_prefix_and_is_unique() {
        let a = new_id("item");
        let b = new_id("item");
        assert!(a.starts_with("item-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("debit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Pix).unwrap();
        assert_eq!(json, "\"pix\"");
    }

    #[test]
    fn test_discount_status_terminal() {
        assert!(!DiscountStatus::Pending.is_terminal());
        assert!(DiscountStatus::Approved.is_terminal());
        assert!(DiscountStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_line_item_values() {
        let item = line(2000, 1, 200);
        assert_eq!(item.gross().cents(), 2000);
        assert_eq!(item.discount().cents(), 200);
        assert_eq!(item.net().cents(), 1800);

        let over_discounted = line(500, 2, 800);
        assert_eq!(over_discounted.net(), Money::zero());
    }

    #[test]
    fn test_discount_request_accepts_legacy_percent_field() {
        let json = r#"{
            "id": "disc-1",
            "item_id": "item-1",
            "requested_by": "ana",
            "percent": 150,
            "status": "pending"
        }"#;
        let request: DiscountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.per_unit.cents(), 150);
        assert_eq!(request.created_at, None);
    }

    #[test]
    fn test_submitted_item_omits_zero_discount() {
        let submitted = SubmittedItem::from(&line(1000, 3, 0));
        assert_eq!(submitted.discount, None);
        let json = serde_json::to_value(&submitted).unwrap();
        assert_eq!(json["productId"], "7891000100103");
        assert!(json.get("discount").is_none());

        let discounted = SubmittedItem::from(&line(1000, 3, 50));
        assert_eq!(discounted.discount, Some(Money::from_cents(50)));
    }
}
