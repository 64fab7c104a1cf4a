//! # Summaries
//!
//! Read-only views shown on the payment and cash-closing screens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::session::PdvSession;
use crate::types::{CashStatus, PaymentMethod, PendingSaleStatus};

/// Balance of the sale in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSummary {
    pub subtotal: Money,
    pub discount_total: Money,
    pub total: Money,
    pub paid: Money,
    pub remaining: Money,
    /// Sum of the change frozen on each payment.
    pub change: Money,
}

impl PaymentSummary {
    pub fn from_session(session: &PdvSession) -> Self {
        let totals = session.totals();
        let payments = session.payments();

        PaymentSummary {
            subtotal: totals.subtotal,
            discount_total: totals.discount_total,
            total: totals.total,
            paid: payments.total_paid(),
            remaining: payments.remaining(totals.total),
            change: payments.total_change(),
        }
    }

    /// Whether finalize would pass the payment check.
    #[inline]
    pub fn is_fully_paid(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Drawer overview displayed before closing.
///
/// `received` and `by_method` cover the payments of the sale currently in
/// progress; finalized sales have already cleared theirs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashSummary {
    pub status: CashStatus,
    /// Float counted at opening; zero while closed.
    pub opening_amount: Money,
    pub received: Money,
    /// Queued sales still awaiting confirmation.
    pub pending_sales: usize,
    pub failed_sales: usize,
    pub by_method: BTreeMap<PaymentMethod, Money>,
}

impl CashSummary {
    pub fn from_session(session: &PdvSession) -> Self {
        let count = |status: PendingSaleStatus| {
            session
                .pending_sales()
                .iter()
                .filter(|s| s.status == status)
                .count()
        };

        CashSummary {
            status: session.cash().status(),
            opening_amount: session.cash().opening_amount().unwrap_or_default(),
            received: session.payments().total_paid(),
            pending_sales: count(PendingSaleStatus::Pending),
            failed_sales: count(PendingSaleStatus::Failed),
            by_method: session.payments().by_method(),
        }
    }
}
