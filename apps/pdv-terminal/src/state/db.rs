//! # Database State
//!
//! Wraps the `Database` connection and the key the session snapshot lives
//! under.
//!
//! ## Thread Safety
//! The `Database` from `pdv-db` contains a `SqlitePool`, which is
//! thread-safe. Commands save without extra locking.

use pdv_core::{PdvSession, STORE_KEY};
use pdv_db::{Database, DbResult, SessionStore};

/// Wrapper around `Database` for command state.
#[derive(Debug)]
pub struct DbState {
    db: Database,
    sessions: SessionStore,
    key: String,
}

impl DbState {
    /// Creates a DbState storing the session under [`STORE_KEY`].
    pub fn new(db: Database) -> Self {
        Self::with_key(db, STORE_KEY)
    }

    pub fn with_key(db: Database, key: impl Into<String>) -> Self {
        let sessions = db.sessions();
        DbState {
            db,
            sessions,
            key: key.into(),
        }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Restores the stored session, or a fresh one.
    pub async fn load(&self) -> DbResult<PdvSession> {
        self.sessions.load_or_default(&self.key).await
    }

    /// Persists `session` as the current snapshot.
    pub async fn save(&self, session: &PdvSession) -> DbResult<()> {
        self.sessions.save(&self.key, session).await
    }
}
