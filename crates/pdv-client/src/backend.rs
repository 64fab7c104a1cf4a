//! Backend seam used by the PDV commands
//!
//! | Call             | Route                 | Fallback               |
//! |------------------|-----------------------|------------------------|
//! | `submit_sale`    | `POST /sales`         | `None`                 |
//! | `open_cash`      | `POST /cash/open`     | `{ status: "open" }`   |
//! | `close_cash`     | `POST /cash/close`    | `{ status: "closed" }` |
//! | `cash_status`    | `GET /cash/status`    | `{ status: "closed" }` |
//! | `payment_status` | `GET /payments/{id}`  | `None`                 |
//!
//! No call returns an error: local state has already moved on by the time
//! these run, so a failure only decides between confirmed and fallback.

use async_trait::async_trait;
use pdv_core::{CashStatus, SaleSubmission};
use tracing::debug;

use crate::api::{CashStatusResponse, CloseCashInput, OpenCashInput, PaymentIntent, SaleRecord};
use crate::{ClientConfig, ClientError, ClientResult, HttpClient, RemoteOutcome};

/// Calls the PDV makes to the ERP backend
#[async_trait]
pub trait PdvBackend: Send + Sync + std::fmt::Debug {
    /// Records a finalized sale
    async fn submit_sale(&self, sale: &SaleSubmission) -> RemoteOutcome<Option<SaleRecord>>;

    /// Reports a drawer opening
    async fn open_cash(&self, input: &OpenCashInput) -> RemoteOutcome<CashStatusResponse>;

    /// Reports a drawer closing with the counted total
    async fn close_cash(&self, input: &CloseCashInput) -> RemoteOutcome<CashStatusResponse>;

    /// Fetches the drawer status known to the backend
    async fn cash_status(&self) -> RemoteOutcome<CashStatusResponse>;

    /// Fetches the gateway status of a payment
    async fn payment_status(&self, payment_id: &str) -> RemoteOutcome<Option<PaymentIntent>>;
}

// ========== HTTP ==========

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: HttpClient,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PdvBackend for HttpBackend {
    async fn submit_sale(&self, sale: &SaleSubmission) -> RemoteOutcome<Option<SaleRecord>> {
        debug!(sale_uid = %sale.sale_uid, items = sale.items.len(), "Submitting sale");
        let result = self.http.post::<Option<SaleRecord>, _>("/sales", sale).await;
        RemoteOutcome::from_result(result, None, "submit_sale")
    }

    async fn open_cash(&self, input: &OpenCashInput) -> RemoteOutcome<CashStatusResponse> {
        let result = self.http.post("/cash/open", input).await;
        RemoteOutcome::from_result(
            result,
            CashStatusResponse::with_status(CashStatus::Open),
            "open_cash",
        )
    }

    async fn close_cash(&self, input: &CloseCashInput) -> RemoteOutcome<CashStatusResponse> {
        let result = self.http.post("/cash/close", input).await;
        RemoteOutcome::from_result(
            result,
            CashStatusResponse::with_status(CashStatus::Closed),
            "close_cash",
        )
    }

    async fn cash_status(&self) -> RemoteOutcome<CashStatusResponse> {
        let result = self.http.get("/cash/status").await;
        RemoteOutcome::from_result(
            result,
            CashStatusResponse::with_status(CashStatus::Closed),
            "cash_status",
        )
    }

    async fn payment_status(&self, payment_id: &str) -> RemoteOutcome<Option<PaymentIntent>> {
        let result = self
            .http
            .get::<Option<PaymentIntent>>(&format!("/payments/{}", payment_id))
            .await;
        RemoteOutcome::from_result(result, None, "payment_status")
    }
}

// ========== Offline ==========

/// Stand-in used when the terminal runs without a backend.
///
/// Every call yields the fallback value without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

#[async_trait]
impl PdvBackend for OfflineBackend {
    async fn submit_sale(&self, _sale: &SaleSubmission) -> RemoteOutcome<Option<SaleRecord>> {
        RemoteOutcome::fallback(None, "submit_sale", ClientError::Offline)
    }

    async fn open_cash(&self, _input: &OpenCashInput) -> RemoteOutcome<CashStatusResponse> {
        RemoteOutcome::fallback(
            CashStatusResponse::with_status(CashStatus::Open),
            "open_cash",
            ClientError::Offline,
        )
    }

    async fn close_cash(&self, _input: &CloseCashInput) -> RemoteOutcome<CashStatusResponse> {
        RemoteOutcome::fallback(
            CashStatusResponse::with_status(CashStatus::Closed),
            "close_cash",
            ClientError::Offline,
        )
    }

    async fn cash_status(&self) -> RemoteOutcome<CashStatusResponse> {
        RemoteOutcome::fallback(
            CashStatusResponse::with_status(CashStatus::Closed),
            "cash_status",
            ClientError::Offline,
        )
    }

    async fn payment_status(&self, _payment_id: &str) -> RemoteOutcome<Option<PaymentIntent>> {
        RemoteOutcome::fallback(None, "payment_status", ClientError::Offline)
    }
}
