//! # Auth State
//!
//! The operator currently at the terminal.
//!
//! Login is a local stub: nobody is verified, the role is taken as given and
//! decides which commands may run.
//!
//! ```text
//! login(email, name?, role) ──► User { id: email, name: name | email, role }
//!                                   │
//! command ──► require(Permission) ──┤── role has it ──► Ok(user)
//!                                   └── missing ──────► PERMISSION_DENIED
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pdv_core::{Permission, Role};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

/// A logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Holds the logged-in operator, if any.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    user: Arc<Mutex<Option<User>>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<User>> {
        // An Option<User> cannot be left half-written
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logs an operator in, replacing whoever was logged in.
    ///
    /// The id is the email, or a short random id when the email is blank.
    /// The display name falls back to the email.
    pub fn login(&self, email: &str, name: Option<&str>, role: Role) -> User {
        let email = email.trim();
        let id = if email.is_empty() {
            Uuid::new_v4().simple().to_string()[..8].to_string()
        } else {
            email.to_string()
        };
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(email)
            .to_string();

        let user = User { id, name, role };
        info!(user_id = %user.id, role = %user.role, "Operator logged in");
        *self.lock() = Some(user.clone());
        user
    }

    /// Logs the operator out, returning who it was.
    pub fn logout(&self) -> Option<User> {
        let user = self.lock().take();
        if let Some(user) = &user {
            info!(user_id = %user.id, "Operator logged out");
        }
        user
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().clone()
    }

    /// False when nobody is logged in.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|u| u.role.has_permission(permission))
    }

    /// Returns the operator if their role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<User, ApiError> {
        let user = self.current_user().ok_or_else(ApiError::unauthenticated)?;
        if !user.role.has_permission(permission) {
            return Err(ApiError::permission_denied(format!(
                "{} lacks {}",
                user.role, permission
            )));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_login_defaults_name_to_email() {
        let auth = AuthState::new();
        let user = auth.login("ana@loja.com", None, Role::Cashier);

        assert_eq!(user.id, "ana@loja.com");
        assert_eq!(user.name, "ana@loja.com");
        assert_eq!(auth.current_user(), Some(user));
    }

    #[test]
    fn test_blank_email_gets_generated_id() {
        let auth = AuthState::new();
        let user = auth.login("", Some("Ana"), Role::Seller);

        assert_eq!(user.id.len(), 8);
        assert_eq!(user.name, "Ana");
    }

    #[test]
    fn test_permissions_follow_role() {
        let auth = AuthState::new();
        assert!(!auth.has_permission(Permission::PdvOperate));

        auth.login("bia", None, Role::Seller);
        assert!(auth.has_permission(Permission::PdvOperate));
        assert!(!auth.has_permission(Permission::CashOpenClose));

        let err = auth.require(Permission::DiscountApprove).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_require_without_login() {
        let auth = AuthState::new();
        let err = auth.require(Permission::PdvOperate).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_logout_clears_user() {
        let auth = AuthState::new();
        auth.login("caio", None, Role::Manager);

        assert_eq!(auth.logout().map(|u| u.id), Some("caio".to_string()));
        assert_eq!(auth.current_user(), None);
        assert_eq!(auth.logout(), None);
    }
}
