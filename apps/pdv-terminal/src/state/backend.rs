//! # Backend State
//!
//! Picks the backend a command talks to.
//!
//! ```text
//! session offline flag ──┬── false, HTTP configured ──► HttpBackend
//!                        └── true, or no HTTP ────────► OfflineBackend
//! ```

use std::sync::Arc;

use pdv_client::{OfflineBackend, PdvBackend};

#[derive(Debug, Clone)]
pub struct BackendState {
    online: Option<Arc<dyn PdvBackend>>,
    offline: Arc<dyn PdvBackend>,
}

impl BackendState {
    /// Uses `backend` whenever the session is online.
    pub fn new(backend: Arc<dyn PdvBackend>) -> Self {
        BackendState {
            online: Some(backend),
            offline: Arc::new(OfflineBackend),
        }
    }

    /// Never touches the network.
    pub fn offline_only() -> Self {
        BackendState {
            online: None,
            offline: Arc::new(OfflineBackend),
        }
    }

    /// Backend to use given the session's offline flag.
    pub fn select(&self, offline: bool) -> Arc<dyn PdvBackend> {
        match (&self.online, offline) {
            (Some(backend), false) => Arc::clone(backend),
            _ => Arc::clone(&self.offline),
        }
    }

    pub fn has_online(&self) -> bool {
        self.online.is_some()
    }
}
