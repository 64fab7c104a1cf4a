//! # Cash Drawer Commands
//!
//! ```text
//!   Closed ──── open_cash(amount) ────► Open
//!     ▲                                   │
//!     └──── close_cash(count, notes) ─────┘  (also clears the sale in progress)
//! ```
//!
//! The local transition is committed first; the backend is told afterwards
//! and its answer only affects the `remote` report.

use pdv_client::api::{CashStatusResponse, CloseCashInput, OpenCashInput};
use pdv_core::summary::CashSummary;
use pdv_core::{CashStatus, Money, Permission};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{commit, RemoteReport};
use crate::error::{ApiError, ErrorCode};
use crate::state::{AuthState, BackendState, DbState, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashResponse {
    pub summary: CashSummary,
    pub remote: RemoteReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashStatusReport {
    pub local: CashStatus,
    pub remote: CashStatusResponse,
    pub report: RemoteReport,
}

/// Opens the drawer with the counted float.
///
/// Refused while the drawer is already open.
pub async fn open_cash(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    backend: &BackendState,
    opening_amount: Money,
) -> Result<CashResponse, ApiError> {
    debug!(amount = %opening_amount, "open_cash command");
    let user = auth.require(Permission::CashOpenClose)?;

    let (summary, offline) = commit(session, db, |s| {
        if s.cash().is_open() {
            return Err(ApiError::new(
                ErrorCode::BusinessLogic,
                "Cash drawer is already open",
            ));
        }
        s.open_cash(opening_amount)?;
        Ok((CashSummary::from_session(s), s.is_offline()))
    })
    .await?;

    info!(amount = %opening_amount, operator = %user.id, "Cash drawer opened");

    let outcome = backend
        .select(offline)
        .open_cash(&OpenCashInput {
            opening_amount,
            operator: user.name,
        })
        .await;

    Ok(CashResponse {
        summary,
        remote: RemoteReport::from_outcome(&outcome),
    })
}

/// Closes the drawer, reporting the counted total.
///
/// The returned summary is taken just before closing, since closing clears
/// the sale in progress. Refused while the drawer is closed.
pub async fn close_cash(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    backend: &BackendState,
    cash_count: Money,
    notes: Option<String>,
) -> Result<CashResponse, ApiError> {
    debug!(count = %cash_count, "close_cash command");
    let user = auth.require(Permission::CashOpenClose)?;

    if cash_count.is_negative() {
        return Err(ApiError::validation("cash count must not be negative"));
    }

    let (summary, offline) = commit(session, db, |s| {
        if !s.cash().is_open() {
            return Err(ApiError::new(
                ErrorCode::BusinessLogic,
                "Cash drawer is not open",
            ));
        }
        let summary = CashSummary::from_session(s);
        s.close_cash();
        Ok((summary, s.is_offline()))
    })
    .await?;

    info!(
        count = %cash_count,
        received = %summary.received,
        pending_sales = summary.pending_sales,
        operator = %user.id,
        "Cash drawer closed"
    );

    let outcome = backend
        .select(offline)
        .close_cash(&CloseCashInput { cash_count, notes })
        .await;

    Ok(CashResponse {
        summary,
        remote: RemoteReport::from_outcome(&outcome),
    })
}

/// Local drawer status next to the one the backend reports.
pub async fn cash_status(
    session: &SessionState,
    backend: &BackendState,
) -> Result<CashStatusReport, ApiError> {
    let (local, offline) = session.with_session(|s| (s.cash().status(), s.is_offline()))?;

    let outcome = backend.select(offline).cash_status().await;
    let report = RemoteReport::from_outcome(&outcome);

    Ok(CashStatusReport {
        local,
        remote: outcome.into_value(),
        report,
    })
}
