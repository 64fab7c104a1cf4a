//! # Sale Commands
//!
//! ```text
//! finish_sale
//!   │
//!   ├── 1. PdvSession::finalize_sale   (cart + payments ─► pending sale)
//!   ├── 2. snapshot saved              (best effort; reported in `store`)
//!   └── 3. submit to backend           (best effort)
//!            ├── Confirmed ─► record returned
//!            └── Fallback ──► warning; pending sale stays queued
//! ```

use pdv_client::api::SaleRecord;
use pdv_core::{Money, PendingSale, PendingSaleStatus, Permission};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{commit, commit_reported, RemoteReport, StoreReport};
use crate::error::ApiError;
use crate::state::{AuthState, BackendState, DbState, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishSaleResponse {
    pub pending_sale: PendingSale,
    pub total: Money,
    pub item_count: usize,
    /// Backend's record of the sale, when it answered with one
    pub record: Option<SaleRecord>,
    /// Whether the finalized session reached the local store
    pub store: StoreReport,
    pub remote: RemoteReport,
}

/// Finalizes the sale in progress and submits it.
///
/// ## Errors
/// - `CART_ERROR`: nothing in the cart
/// - `PAYMENT_ERROR`: part of the total is unpaid (nothing changes)
///
/// Once the sale is finalized the submission always goes out, even when the
/// snapshot could not be written.
pub async fn finish_sale(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    backend: &BackendState,
) -> Result<FinishSaleResponse, ApiError> {
    debug!("finish_sale command");
    auth.require(Permission::PdvOperate)?;

    let ((finalized, offline), store) =
        commit_reported(session, db, |s| Ok((s.finalize_sale()?, s.is_offline()))).await?;

    info!(
        sale_uid = %finalized.pending_sale.sale_uid,
        total = %finalized.submission.total,
        "Sale recorded locally"
    );

    let outcome = backend
        .select(offline)
        .submit_sale(&finalized.submission)
        .await;
    let remote = RemoteReport::from_outcome(&outcome);

    Ok(FinishSaleResponse {
        total: finalized.submission.total,
        item_count: finalized.submission.items.len(),
        pending_sale: finalized.pending_sale,
        record: outcome.into_value(),
        store,
        remote,
    })
}

/// Records a reconciliation result for a queued sale.
pub async fn mark_pending_sale(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    sale_uid: &str,
    status: PendingSaleStatus,
) -> Result<Vec<PendingSale>, ApiError> {
    debug!(sale_uid = %sale_uid, status = ?status, "mark_pending_sale command");
    auth.require(Permission::PdvOperate)?;

    commit(session, db, |s| {
        s.mark_pending_sale(sale_uid, status)?;
        Ok(s.pending_sales().to_vec())
    })
    .await
}

/// Queued sales, oldest first.
pub fn list_pending_sales(session: &SessionState) -> Result<Vec<PendingSale>, ApiError> {
    session.with_session(|s| s.pending_sales().to_vec())
}

/// Switches the session between online and offline mode.
///
/// Offline sessions use the offline backend for every remote call.
pub async fn set_offline(
    session: &SessionState,
    db: &DbState,
    offline: bool,
) -> Result<bool, ApiError> {
    commit(session, db, |s| {
        s.set_offline(offline);
        Ok(s.is_offline())
    })
    .await?;

    info!(offline, "Connectivity mode changed");
    Ok(offline)
}
