//! Wire types exchanged with the ERP backend
//!
//! Field names are camelCase on the wire. Amounts travel as integer cents,
//! the same representation [`Money`] serializes to.

use pdv_core::{CashStatus, Money, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};

// ========== Cash ==========

/// Cash drawer snapshot as the backend sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashStatusResponse {
    pub status: CashStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<CashEntry>>,
}

impl CashStatusResponse {
    /// Bare snapshot carrying only a status
    pub fn with_status(status: CashStatus) -> Self {
        Self {
            status,
            opened_at: None,
            opening_amount: None,
            operator: None,
            entries: None,
        }
    }
}

/// Per-method takings reported with a cash snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    pub method: PaymentMethod,
    pub amount: Money,
}

/// Body of `POST /cash/open`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCashInput {
    pub opening_amount: Money,
    pub operator: String,
}

/// Body of `POST /cash/close`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseCashInput {
    /// Physically counted drawer total
    pub cash_count: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ========== Sales ==========

/// Backend-side status of a recorded sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Paid,
    Cancelled,
}

/// Sale as stored by the backend, returned by `POST /sales`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    pub total: Money,
    pub status: SaleStatus,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    pub created_at: String,
    #[serde(default)]
    pub customer_name: Option<String>,
}

// ========== Payments ==========

/// Gateway status of a payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    Authorized,
    Captured,
    Reversed,
    Failed,
}

impl From<IntentStatus> for PaymentStatus {
    /// A reversed intent never settles, so it counts as failed locally.
    fn from(status: IntentStatus) -> Self {
        match status {
            IntentStatus::Pending => PaymentStatus::Pending,
            IntentStatus::Authorized => PaymentStatus::Authorized,
            IntentStatus::Captured => PaymentStatus::Captured,
            IntentStatus::Reversed | IntentStatus::Failed => PaymentStatus::Failed,
        }
    }
}

/// Payment intent returned by `GET /payments/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount: Money,
    pub status: IntentStatus,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_status_decodes_minimal_body() {
        let snapshot: CashStatusResponse = serde_json::from_str(r#"{"status":"open"}"#).unwrap();
        assert_eq!(snapshot, CashStatusResponse::with_status(CashStatus::Open));
    }

    #[test]
    fn test_open_cash_input_is_camel_case() {
        let input = OpenCashInput {
            opening_amount: Money::from_cents(10000),
            operator: "ana".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["openingAmount"], 10000);
        assert_eq!(json["operator"], "ana");
    }

    #[test]
    fn test_payment_intent_decodes() {
        let json = r#"{
            "id": "pi-1",
            "saleId": "sale-1",
            "method": "pix",
            "amount": 3000,
            "status": "reversed",
            "createdAt": "2026-01-01T10:00:00Z"
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.method, PaymentMethod::Pix);
        assert_eq!(PaymentStatus::from(intent.status), PaymentStatus::Failed);
    }
}
