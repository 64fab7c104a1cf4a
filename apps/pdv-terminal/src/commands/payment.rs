//! # Payment Commands
//!
//! ```text
//! total R$ 30,00
//!   pay card 20 ──► remaining R$ 10,00, change 0
//!   pay cash 15 ──► remaining 0,         change R$ 5,00 (frozen on the entry)
//!   pay pix 1   ──► refused: nothing left to pay
//! ```

use pdv_client::RemoteOutcome;
use pdv_core::summary::PaymentSummary;
use pdv_core::{Money, PaymentEntry, PaymentMethod, PaymentStatus, Permission};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{commit, RemoteReport};
use crate::error::{ApiError, ErrorCode};
use crate::state::{AuthState, BackendState, DbState, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentResponse {
    pub payment: PaymentEntry,
    pub summary: PaymentSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub payment_id: String,
    pub status: PaymentStatus,
    /// Whether the local status changed
    pub updated: bool,
    pub remote: RemoteReport,
}

/// Records a tender against the sale in progress.
///
/// Refused while the drawer is closed or once nothing is left to pay.
pub async fn add_payment(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    method: PaymentMethod,
    amount: Money,
) -> Result<AddPaymentResponse, ApiError> {
    debug!(method = %method, amount = %amount, "add_payment command");
    auth.require(Permission::PdvOperate)?;

    let response = commit(session, db, |s| {
        if !s.cash().is_open() {
            return Err(ApiError::new(ErrorCode::PaymentError, "Cash drawer is closed"));
        }
        if s.remaining().is_zero() {
            return Err(ApiError::new(ErrorCode::PaymentError, "Nothing left to pay"));
        }

        let id = s.add_payment(method, amount)?;
        let payment = s
            .payments()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("Payment vanished after insert"))?;

        Ok(AddPaymentResponse {
            payment,
            summary: PaymentSummary::from_session(s),
        })
    })
    .await?;

    info!(
        payment_id = %response.payment.id,
        method = %method,
        amount = %amount,
        remaining = %response.summary.remaining,
        change = %response.payment.change,
        "Payment added"
    );
    Ok(response)
}

/// Asks the gateway for a payment's status and records it.
///
/// Without a confirmed answer the local status is left as it is.
pub async fn refresh_payment_status(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    backend: &BackendState,
    payment_id: &str,
) -> Result<PaymentStatusResponse, ApiError> {
    debug!(payment_id = %payment_id, "refresh_payment_status command");
    auth.require(Permission::PdvOperate)?;

    let (current, offline) = session.with_session(|s| {
        (
            s.payments().get(payment_id).map(|p| p.status),
            s.is_offline(),
        )
    })?;
    let current = current.ok_or_else(|| ApiError::not_found("Payment", payment_id))?;

    let outcome = backend.select(offline).payment_status(payment_id).await;
    let remote = RemoteReport::from_outcome(&outcome);

    let reported = match &outcome {
        RemoteOutcome::Confirmed(Some(intent)) => Some(PaymentStatus::from(intent.status)),
        _ => None,
    };

    let Some(status) = reported.filter(|s| *s != current) else {
        return Ok(PaymentStatusResponse {
            payment_id: payment_id.to_string(),
            status: current,
            updated: false,
            remote,
        });
    };

    commit(session, db, |s| Ok(s.set_payment_status(payment_id, status)?)).await?;
    info!(payment_id = %payment_id, from = %current, to = %status, "Payment status updated");

    Ok(PaymentStatusResponse {
        payment_id: payment_id.to_string(),
        status,
        updated: true,
        remote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_item;
    use crate::commands::cash::open_cash;
    use crate::commands::testing::{fixture, Fixture};
    use pdv_client::api::IntentStatus;
    use pdv_core::cart::NewLineItem;
    use pdv_core::Role;

    async fn sale_of(f: &Fixture, cents: i64) {
        open_cash(&f.auth, &f.session, &f.db, &f.backend, Money::zero())
            .await
            .unwrap();
        add_item(
            &f.auth,
            &f.session,
            &f.db,
            NewLineItem {
                code: "A".into(),
                name: "Cafe".into(),
                unit_price: Money::from_cents(cents),
                quantity: 1,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_split_tender_freezes_change() {
        let f = fixture(Role::Cashier).await;
        sale_of(&f, 3000).await;

        let first = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Card, Money::from_cents(2000))
            .await
            .unwrap();
        assert_eq!(first.summary.remaining, Money::from_cents(1000));
        assert_eq!(first.payment.change, Money::zero());

        let second = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Cash, Money::from_cents(1500))
            .await
            .unwrap();
        assert_eq!(second.summary.remaining, Money::zero());
        assert_eq!(second.payment.change, Money::from_cents(500));
        assert!(second.summary.is_fully_paid());
    }

    #[tokio::test]
    async fn test_payment_refused_when_fully_paid() {
        let f = fixture(Role::Cashier).await;
        sale_of(&f, 1000).await;
        add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Pix, Money::from_cents(1000))
            .await
            .unwrap();

        let err = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Pix, Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[tokio::test]
    async fn test_payment_refused_while_drawer_closed() {
        let f = fixture(Role::Cashier).await;

        let err = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Cash, Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_validation_error() {
        let f = fixture(Role::Cashier).await;
        sale_of(&f, 1000).await;

        let err = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Cash, Money::zero())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_refresh_records_gateway_status() {
        let f = fixture(Role::Cashier).await;
        sale_of(&f, 1000).await;
        let paid = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Card, Money::from_cents(1000))
            .await
            .unwrap();
        *f.recorder.intent_status.lock().unwrap() = Some(IntentStatus::Captured);

        let response = refresh_payment_status(&f.auth, &f.session, &f.db, &f.backend, &paid.payment.id)
            .await
            .unwrap();

        assert!(response.updated);
        assert_eq!(response.status, PaymentStatus::Captured);
        let stored = f
            .session
            .with_session(|s| s.payments().get(&paid.payment.id).map(|p| p.status))
            .unwrap();
        assert_eq!(stored, Some(PaymentStatus::Captured));
    }

    #[tokio::test]
    async fn test_refresh_without_answer_keeps_status() {
        let f = fixture(Role::Cashier).await;
        sale_of(&f, 1000).await;
        let paid = add_payment(&f.auth, &f.session, &f.db, PaymentMethod::Card, Money::from_cents(1000))
            .await
            .unwrap();

        let response = refresh_payment_status(&f.auth, &f.session, &f.db, &f.backend, &paid.payment.id)
            .await
            .unwrap();

        assert!(!response.updated);
        assert_eq!(response.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_refresh_unknown_payment() {
        let f = fixture(Role::Cashier).await;
        let err = refresh_payment_status(&f.auth, &f.session, &f.db, &f.backend, "pay-x")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
