//! # Discount Commands
//!
//! ```text
//! cashier ── request_discount(item, per_unit) ──► pending
//!                                                    │
//! manager ── approve_discount ──► approved (line discount set)
//!         └─ reject_discount ───► rejected (cart untouched)
//! ```
//!
//! Requesting needs `PDV_OPERATE`; deciding needs `DISCOUNT_APPROVE`.

use pdv_core::discount::ApprovalOutcome;
use pdv_core::{DiscountRequest, Money, Permission};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cart::CartResponse;
use super::commit;
use crate::error::ApiError;
use crate::state::{AuthState, DbState, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub request: DiscountRequest,
    /// Whether the cart line changed
    pub applied: bool,
    pub note: Option<String>,
    pub cart: CartResponse,
}

/// Files a discount request for a line.
///
/// The line does not have to be in the cart yet; it is looked up at
/// approval time.
pub async fn request_discount(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    item_id: &str,
    per_unit: Money,
) -> Result<DiscountResponse, ApiError> {
    debug!(item_id = %item_id, per_unit = %per_unit, "request_discount command");
    let user = auth.require(Permission::PdvOperate)?;

    let response = commit(session, db, |s| {
        let id = s.request_discount(item_id, per_unit, &user.id)?;
        response_for(s, &id, false, None)
    })
    .await?;

    info!(request_id = %response.request.id, item_id = %item_id, by = %user.id, "Discount requested");
    Ok(response)
}

/// Approves a pending request, applying its value to the line.
///
/// If the line has left the cart the request stays pending and the
/// response carries a note instead.
pub async fn approve_discount(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    request_id: &str,
) -> Result<DiscountResponse, ApiError> {
    debug!(request_id = %request_id, "approve_discount command");
    let user = auth.require(Permission::DiscountApprove)?;

    let response = commit(session, db, |s| match s.approve_discount(request_id, &user.id)? {
        ApprovalOutcome::Applied { .. } => response_for(s, request_id, true, None),
        ApprovalOutcome::ItemNotInCart { item_id } => response_for(
            s,
            request_id,
            false,
            Some(format!("Item {} is no longer in the cart", item_id)),
        ),
        ApprovalOutcome::RequestNotFound => {
            Err(ApiError::not_found("Discount request", request_id))
        }
    })
    .await?;

    if response.applied {
        info!(request_id = %request_id, by = %user.id, "Discount approved");
    }
    Ok(response)
}

/// Rejects a pending request.
pub async fn reject_discount(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    request_id: &str,
) -> Result<DiscountResponse, ApiError> {
    debug!(request_id = %request_id, "reject_discount command");
    let user = auth.require(Permission::DiscountApprove)?;

    let response = commit(session, db, |s| {
        if !s.reject_discount(request_id, &user.id)? {
            return Err(ApiError::not_found("Discount request", request_id));
        }
        response_for(s, request_id, false, None)
    })
    .await?;

    info!(request_id = %request_id, by = %user.id, "Discount rejected");
    Ok(response)
}

/// Requests still awaiting a decision.
pub fn pending_discounts(session: &SessionState) -> Result<Vec<DiscountRequest>, ApiError> {
    session.with_session(|s| s.discount_requests().pending().cloned().collect())
}

fn response_for(
    s: &pdv_core::PdvSession,
    request_id: &str,
    applied: bool,
    note: Option<String>,
) -> Result<DiscountResponse, ApiError> {
    let request = s
        .discount_requests()
        .get(request_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Discount request", request_id))?;

    Ok(DiscountResponse {
        request,
        applied,
        note,
        cart: CartResponse::from(s),
    })
}
