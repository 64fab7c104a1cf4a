//! # Commands Module
//!
//! Every operation the operator can trigger.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (commit helper, remote report)
//! ├── auth.rs      ◄─── Login / logout (session lifecycle)
//! ├── cash.rs      ◄─── Drawer open / close / status
//! ├── cart.rs      ◄─── Line items, customer
//! ├── discount.rs  ◄─── Discount requests and approvals
//! ├── payment.rs   ◄─── Tender entry, gateway status refresh
//! ├── sale.rs      ◄─── Finalize, reconciliation, offline toggle
//! └── report.rs    ◄─── Payment and cash summaries
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. auth.require(Permission)          ─► PERMISSION_DENIED on failure   │
//! │  2. session.with_session_mut(|s| ..)  ─► core transition, under lock    │
//! │  3. db.save(snapshot)                 ─► after the lock is released;    │
//! │                                          a failure is only a warning    │
//! │  4. backend call (if any)             ─► Confirmed or Fallback + warn   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A command that fails in step 1 or 2 changes nothing. Failures in steps 3
//! and 4 never undo step 2.
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the session
//! fn get_cart(session: &SessionState)
//!
//! // Needs the gate, the session and the store
//! async fn add_item(auth: &AuthState, session: &SessionState, db: &DbState, ..)
//! ```

pub mod auth;
pub mod cart;
pub mod cash;
pub mod discount;
pub mod payment;
pub mod report;
pub mod sale;

use pdv_client::RemoteOutcome;
use pdv_core::PdvSession;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::state::{DbState, SessionState};

/// Applies `f` to the session under the lock, then persists the result.
///
/// Nothing is saved when `f` fails. A failed save is logged and does not
/// undo the transition; the snapshot catches up on the next commit.
pub(crate) async fn commit<F, R>(
    session: &SessionState,
    db: &DbState,
    f: F,
) -> Result<R, ApiError>
where
    F: FnOnce(&mut PdvSession) -> Result<R, ApiError>,
{
    let (output, _) = commit_reported(session, db, f).await?;
    Ok(output)
}

/// [`commit`], also returning whether the snapshot was written.
pub(crate) async fn commit_reported<F, R>(
    session: &SessionState,
    db: &DbState,
    f: F,
) -> Result<(R, StoreReport), ApiError>
where
    F: FnOnce(&mut PdvSession) -> Result<R, ApiError>,
{
    let (output, snapshot) = session.with_session_mut(|s| {
        let output = f(s)?;
        Ok((output, s.clone()))
    })?;

    let report = match db.save(&snapshot).await {
        Ok(()) => StoreReport::saved(),
        Err(e) => {
            warn!(error = %e, key = %db.key(), "Could not save session snapshot");
            StoreReport::failed(e.to_string())
        }
    };

    Ok((output, report))
}

/// Whether a committed change reached the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreReport {
    pub saved: bool,
    pub warning: Option<String>,
}

impl StoreReport {
    fn saved() -> Self {
        StoreReport {
            saved: true,
            warning: None,
        }
    }

    fn failed(reason: String) -> Self {
        StoreReport {
            saved: false,
            warning: Some(reason),
        }
    }
}

/// Whether the backend confirmed a call, for command responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReport {
    pub confirmed: bool,
    pub warning: Option<String>,
}

impl RemoteReport {
    pub fn from_outcome<T>(outcome: &RemoteOutcome<T>) -> Self {
        RemoteReport {
            confirmed: outcome.is_confirmed(),
            warning: outcome.reason().map(str::to_string),
        }
    }
}
