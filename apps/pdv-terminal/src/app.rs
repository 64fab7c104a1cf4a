//! # App
//!
//! Bundles the state objects the command loop hands to commands.

use crate::state::{AuthState, BackendState, ConfigState, DbState, SessionState};

/// Everything a running terminal holds.
#[derive(Debug)]
pub struct App {
    pub config: ConfigState,
    pub auth: AuthState,
    pub session: SessionState,
    pub db: DbState,
    pub backend: BackendState,
}

impl App {
    /// Creates the app with nobody logged in.
    pub fn new(config: ConfigState, db: DbState, backend: BackendState) -> Self {
        App {
            config,
            auth: AuthState::new(),
            session: SessionState::new(),
            db,
            backend,
        }
    }
}
