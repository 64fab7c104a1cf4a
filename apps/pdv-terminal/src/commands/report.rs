//! # Report Commands
//!
//! Read-only views for the payment and cash-closing screens.

use pdv_core::summary::{CashSummary, PaymentSummary};
use tracing::debug;

use crate::error::ApiError;
use crate::state::SessionState;

/// Balance of the sale in progress.
pub fn payment_summary(session: &SessionState) -> Result<PaymentSummary, ApiError> {
    debug!("payment_summary command");
    session.with_session(PaymentSummary::from_session)
}

/// Drawer overview: status, float, takings by method, queued sales.
pub fn cash_summary(session: &SessionState) -> Result<CashSummary, ApiError> {
    debug!("cash_summary command");
    session.with_session(CashSummary::from_session)
}
