//! # Session Store
//!
//! Saves and restores a [`PdvSession`] as one JSON snapshot.
//!
//! ## Restore Rules
//! ```text
//! load_or_default(key)
//!      │
//!      ├── no row ─────────────────► PdvSession::default()
//!      ├── row, JSON decodes ──────► restored session
//!      └── row, JSON is garbage ───► warn! + PdvSession::default()
//! ```
//!
//! The core never calls this; the app saves after each committed command.

use pdv_core::PdvSession;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::repository::snapshot::SnapshotRepository;

/// Typed wrapper over [`SnapshotRepository`] for session snapshots.
#[derive(Debug, Clone)]
pub struct SessionStore {
    snapshots: SnapshotRepository,
}

impl SessionStore {
    pub fn new(snapshots: SnapshotRepository) -> Self {
        SessionStore { snapshots }
    }

    /// Restores the session under `key`, or a fresh one.
    ///
    /// Only SQL failures are errors; a corrupt snapshot is replaced by a
    /// default session and the bad payload is left in place until the next
    /// save overwrites it.
    pub async fn load_or_default(&self, key: &str) -> DbResult<PdvSession> {
        let Some(payload) = self.snapshots.load(key).await? else {
            debug!(key = %key, "No snapshot stored, starting fresh session");
            return Ok(PdvSession::default());
        };

        match serde_json::from_str::<PdvSession>(&payload) {
            Ok(session) => {
                debug!(
                    key = %key,
                    items = session.cart().len(),
                    pending_sales = session.pending_sales().len(),
                    "Session restored"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable session snapshot");
                Ok(PdvSession::default())
            }
        }
    }

    /// Writes the session under `key`, replacing any previous snapshot.
    pub async fn save(&self, key: &str, session: &PdvSession) -> DbResult<()> {
        let payload = serde_json::to_string(session)?;
        self.snapshots.save(key, &payload).await
    }

    /// Removes the snapshot under `key`.
    pub async fn clear(&self, key: &str) -> DbResult<bool> {
        self.snapshots.delete(key).await
    }
}
