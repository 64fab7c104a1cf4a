//! # Cash Session
//!
//! Open/closed state of the cash drawer.
//!
//! ```text
//!   ┌────────┐  open(amount)  ┌──────────────────────────────┐
//!   │ Closed │ ─────────────► │ Open { opening_amount,       │
//!   │        │ ◄───────────── │        opened_at }           │
//!   └────────┘    close()     └──────────────────────────────┘
//!                                  │ open(amount) again
//!                                  └──► overwrites amount and timestamp
//! ```
//!
//! Closing the drawer also resets the sale in progress; that cascade lives in
//! [`PdvSession::close_cash`](crate::session::PdvSession::close_cash) because
//! the drawer alone does not own the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::CashStatus;
use crate::validation::{validate_opening_amount, ValidationResult};

/// Cash drawer state. Opening data exists only while open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CashSession {
    #[default]
    Closed,
    Open {
        opening_amount: Money,
        #[ts(as = "String")]
        opened_at: DateTime<Utc>,
    },
}

impl CashSession {
    /// Opens the drawer with the counted float.
    ///
    /// Opening an already-open drawer replaces the amount and timestamp.
    pub fn open(&mut self, opening_amount: Money) -> ValidationResult<()> {
        validate_opening_amount(opening_amount)?;

        *self = CashSession::Open {
            opening_amount,
            opened_at: Utc::now(),
        };
        Ok(())
    }

    /// Closes the drawer. Closing a closed drawer is a no-op.
    pub fn close(&mut self) {
        *self = CashSession::Closed;
    }

    pub fn status(&self) -> CashStatus {
        match self {
            CashSession::Closed => CashStatus::Closed,
            CashSession::Open { .. } => CashStatus::Open,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, CashSession::Open { .. })
    }

    /// Float counted at opening, if open.
    pub fn opening_amount(&self) -> Option<Money> {
        match self {
            CashSession::Open { opening_amount, .. } => Some(*opening_amount),
            CashSession::Closed => None,
        }
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        match self {
            CashSession::Open { opened_at, .. } => Some(*opened_at),
            CashSession::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let cash = CashSession::default();
        assert_eq!(cash.status(), CashStatus::Closed);
        assert_eq!(cash.opening_amount(), None);
        assert_eq!(cash.opened_at(), None);
    }

    #[test]
    fn test_open_and_close() {
        let mut cash = CashSession::default();
        cash.open(Money::from_cents(10000)).unwrap();

        assert!(cash.is_open());
        assert_eq!(cash.opening_amount(), Some(Money::from_cents(10000)));
        assert!(cash.opened_at().is_some());

        cash.close();
        assert_eq!(cash, CashSession::Closed);
    }

    #[test]
    fn test_open_with_zero_is_allowed() {
        let mut cash = CashSession::default();
        assert!(cash.open(Money::zero()).is_ok());
        assert_eq!(cash.opening_amount(), Some(Money::zero()));
    }

    #[test]
    fn test_negative_opening_is_refused_without_change() {
        let mut cash = CashSession::default();
        assert!(cash.open(Money::from_cents(-1)).is_err());
        assert_eq!(cash.status(), CashStatus::Closed);

        cash.open(Money::from_cents(500)).unwrap();
        assert!(cash.open(Money::from_cents(-1)).is_err());
        assert_eq!(cash.opening_amount(), Some(Money::from_cents(500)));
    }

    #[test]
    fn test_reopen_overwrites() {
        let mut cash = CashSession::default();
        cash.open(Money::from_cents(500)).unwrap();
        cash.open(Money::from_cents(800)).unwrap();
        assert_eq!(cash.opening_amount(), Some(Money::from_cents(800)));
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let closed = serde_json::to_value(CashSession::Closed).unwrap();
        assert_eq!(closed["status"], "closed");

        let mut cash = CashSession::default();
        cash.open(Money::from_cents(2500)).unwrap();
        let open = serde_json::to_value(&cash).unwrap();
        assert_eq!(open["status"], "open");
        assert_eq!(open["opening_amount"], 2500);

        let back: CashSession = serde_json::from_value(open).unwrap();
        assert_eq!(back, cash);
    }
}
