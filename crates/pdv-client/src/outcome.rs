//! Confirmed-or-fallback result of a backend call
//!
//! ```text
//! backend call ──► Ok(value) ──────────► Confirmed(value)
//!              └─► Err(e)    ── warn! ─► Fallback { value: <stand-in>, reason }
//! ```
//!
//! Callers always get a usable value; whether it came from the backend is
//! explicit in the variant.

use std::fmt::Display;

use tracing::warn;

use crate::ClientResult;

/// Outcome of a call whose failure is tolerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome<T> {
    /// The backend answered
    Confirmed(T),
    /// The call failed; `value` is the stand-in the caller proceeds with
    Fallback { value: T, reason: String },
}

impl<T> RemoteOutcome<T> {
    /// Turns a call result into an outcome, logging failures.
    pub fn from_result(result: ClientResult<T>, fallback: T, operation: &str) -> Self {
        match result {
            Ok(value) => RemoteOutcome::Confirmed(value),
            Err(e) => Self::fallback(fallback, operation, e),
        }
    }

    /// Builds a fallback outcome, logging why.
    pub fn fallback(value: T, operation: &str, reason: impl Display) -> Self {
        let reason = reason.to_string();
        warn!(operation = %operation, reason = %reason, "Backend call failed, using fallback");
        RemoteOutcome::Fallback { value, reason }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, RemoteOutcome::Confirmed(_))
    }

    pub fn value(&self) -> &T {
        match self {
            RemoteOutcome::Confirmed(value) | RemoteOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            RemoteOutcome::Confirmed(value) | RemoteOutcome::Fallback { value, .. } => value,
        }
    }

    /// Failure reason, if this is a fallback.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RemoteOutcome::Confirmed(_) => None,
            RemoteOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RemoteOutcome<U> {
        match self {
            RemoteOutcome::Confirmed(value) => RemoteOutcome::Confirmed(f(value)),
            RemoteOutcome::Fallback { value, reason } => RemoteOutcome::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}
