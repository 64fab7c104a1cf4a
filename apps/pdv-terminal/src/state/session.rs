//! # Session State
//!
//! The one live [`PdvSession`] of this terminal.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login ──► DbState::load ──► begin(session)                             │
//! │                                   │                                     │
//! │  command ──► with_session_mut ────┤ (lock held only inside the closure) │
//! │                  │                │                                     │
//! │                  └──► clone ──► DbState::save (lock released)           │
//! │                                   │                                     │
//! │  logout ──► end() ──► DbState::save ──► dropped                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` so only one command mutates it
//! at a time. Closures are synchronous, so the lock can never be held across
//! an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pdv_core::PdvSession;

use crate::error::ApiError;

/// Holds the active session between login and logout.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<Option<PdvSession>>>,
}

impl SessionState {
    /// Creates a state with no active session.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PdvSession>> {
        // Session methods validate before mutating, so a panic mid-command
        // cannot leave a half-applied transition behind
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs `session` as the active one, replacing any other.
    pub fn begin(&self, session: PdvSession) {
        *self.lock() = Some(session);
    }

    /// Takes the active session out, leaving none.
    pub fn end(&self) -> Option<PdvSession> {
        self.lock().take()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = session_state.with_session(|s| s.totals())?;
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&PdvSession) -> R,
    {
        let guard = self.lock();
        let session = guard.as_ref().ok_or_else(ApiError::unauthenticated)?;
        Ok(f(session))
    }

    /// Executes a fallible function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session_state.with_session_mut(|s| Ok(s.open_cash(amount)?))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut PdvSession) -> Result<R, ApiError>,
    {
        let mut guard = self.lock();
        let session = guard.as_mut().ok_or_else(ApiError::unauthenticated)?;
        f(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pdv_core::Money;

    #[test]
    fn test_no_session_before_begin() {
        let state = SessionState::new();
        assert!(!state.is_active());

        let err = state.with_session(|s| s.totals()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_mutation_is_visible_to_readers() {
        let state = SessionState::new();
        state.begin(PdvSession::new());

        state
            .with_session_mut(|s| Ok(s.open_cash(Money::from_cents(5000))?))
            .unwrap();

        assert!(state.with_session(|s| s.cash().is_open()).unwrap());
    }

    #[test]
    fn test_end_hands_back_session() {
        let state = SessionState::new();
        state.begin(PdvSession::new());
        state.with_session_mut(|s| {
            s.set_offline(true);
            Ok(())
        })
        .unwrap();

        let ended = state.end().unwrap();
        assert!(ended.is_offline());
        assert!(!state.is_active());
    }
}
