//! # Auth Commands
//!
//! Login starts a session, logout ends it.
//!
//! ```text
//! login ──► AuthState::login ──► DbState::load ──► SessionState::begin
//!                                     │
//!                                     └── SQL failure: warn!, fresh session
//!
//! logout ──► DbState::save ──► SessionState::end ──► AuthState::logout
//! ```

use pdv_core::{CashStatus, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::{AuthState, DbState, SessionState, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub cash_status: CashStatus,
    /// Lines carried over from the restored session
    pub restored_items: usize,
    pub pending_sales: usize,
}

/// Logs an operator in and restores the stored session.
pub async fn login(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    email: &str,
    name: Option<&str>,
    role: Role,
) -> Result<LoginResponse, ApiError> {
    let user = auth.login(email, name, role);

    let restored = match db.load().await {
        Ok(restored) => restored,
        Err(e) => {
            warn!(error = %e, key = %db.key(), "Could not load session, starting fresh");
            pdv_core::PdvSession::default()
        }
    };

    let response = LoginResponse {
        user,
        cash_status: restored.cash().status(),
        restored_items: restored.cart().len(),
        pending_sales: restored.pending_sales().len(),
    };
    session.begin(restored);

    info!(
        cash = %response.cash_status,
        items = response.restored_items,
        pending_sales = response.pending_sales,
        "Session started"
    );
    Ok(response)
}

/// Saves the session, drops it and logs the operator out.
///
/// The session stays active if the save fails.
pub async fn logout(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
) -> Result<Option<User>, ApiError> {
    if session.is_active() {
        let snapshot = session.with_session(|s| s.clone())?;
        db.save(&snapshot).await?;
        session.end();
    }

    Ok(auth.logout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::fixture;
    use pdv_core::Money;

    #[tokio::test]
    async fn test_login_starts_fresh_session() {
        let f = fixture(Role::Cashier).await;

        assert!(f.session.is_active());
        assert_eq!(f.auth.current_user().map(|u| u.name), Some("Ana".to_string()));
        assert!(f.session.with_session(|s| s.cart().is_empty()).unwrap());
    }

    #[tokio::test]
    async fn test_logout_then_login_restores_state() {
        let f = fixture(Role::Cashier).await;
        f.session
            .with_session_mut(|s| Ok(s.open_cash(Money::from_cents(10000))?))
            .unwrap();

        let user = logout(&f.auth, &f.session, &f.db).await.unwrap();
        assert_eq!(user.map(|u| u.id), Some("ana@loja.com".to_string()));
        assert!(!f.session.is_active());

        let response = login(&f.auth, &f.session, &f.db, "bia", None, Role::Seller)
            .await
            .unwrap();
        assert_eq!(response.cash_status, CashStatus::Open);
        assert_eq!(response.user.name, "bia");
    }
}
