//! # Roles and Permissions
//!
//! Static role → capability table used by the app to gate commands.
//!
//! ```text
//! ┌──────────────────┬───────┬─────────┬─────────┬────────┐
//! │ Permission       │ Admin │ Manager │ Cashier │ Seller │
//! ├──────────────────┼───────┼─────────┼─────────┼────────┤
//! │ PdvOperate       │   ✓   │    ✓    │    ✓    │   ✓    │
//! │ CashOpenClose    │   ✓   │    ✓    │    ✓    │        │
//! │ CatalogView      │   ✓   │    ✓    │    ✓    │   ✓    │
//! │ CatalogEdit      │   ✓   │    ✓    │         │        │
//! │ PricingTool      │   ✓   │    ✓    │         │        │
//! │ DiscountApprove  │   ✓   │    ✓    │         │        │
//! │ ChatInternal     │   ✓   │    ✓    │    ✓    │   ✓    │
//! └──────────────────┴───────┴─────────┴─────────┴────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// A capability checked before running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    PdvOperate,
    CashOpenClose,
    CatalogView,
    CatalogEdit,
    PricingTool,
    DiscountApprove,
    ChatInternal,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::PdvOperate => "PDV_OPERATE",
            Permission::CashOpenClose => "CASH_OPEN_CLOSE",
            Permission::CatalogView => "CATALOG_VIEW",
            Permission::CatalogEdit => "CATALOG_EDIT",
            Permission::PricingTool => "PRICING_TOOL",
            Permission::DiscountApprove => "DISCOUNT_APPROVE",
            Permission::ChatInternal => "CHAT_INTERNAL",
        };
        f.write_str(s)
    }
}

const ALL_PERMISSIONS: &[Permission] = &[
    Permission::PdvOperate,
    Permission::CashOpenClose,
    Permission::CatalogView,
    Permission::CatalogEdit,
    Permission::PricingTool,
    Permission::DiscountApprove,
    Permission::ChatInternal,
];

const CASHIER_PERMISSIONS: &[Permission] = &[
    Permission::PdvOperate,
    Permission::CashOpenClose,
    Permission::CatalogView,
    Permission::ChatInternal,
];

const SELLER_PERMISSIONS: &[Permission] = &[
    Permission::PdvOperate,
    Permission::CatalogView,
    Permission::ChatInternal,
];

/// Staff role of the logged-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    /// Store manager ("gerente").
    Manager,
    /// Cash operator ("caixa").
    Cashier,
    /// Floor salesperson ("vendedor").
    Seller,
}

impl Role {
    /// Capabilities granted to this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin | Role::Manager => ALL_PERMISSIONS,
            Role::Cashier => CASHIER_PERMISSIONS,
            Role::Seller => SELLER_PERMISSIONS,
        }
    }

    #[inline]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Cashier => "CASHIER",
            Role::Seller => "SELLER",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Accepts the English names and the Portuguese ones used on the floor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" | "GERENTE" => Ok(Role::Manager),
            "CASHIER" | "CAIXA" => Ok(Role::Cashier),
            "SELLER" | "VENDEDOR" => Ok(Role::Seller),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "admin".to_string(),
                    "manager".to_string(),
                    "cashier".to_string(),
                    "seller".to_string(),
                ],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_and_manager_have_everything() {
        for role in [Role::Admin, Role::Manager] {
            for permission in ALL_PERMISSIONS {
                assert!(role.has_permission(*permission), "{role} lacks {permission}");
            }
        }
    }

    #[test]
    fn test_cashier_permissions() {
        assert!(Role::Cashier.has_permission(Permission::PdvOperate));
        assert!(Role::Cashier.has_permission(Permission::CashOpenClose));
        assert!(!Role::Cashier.has_permission(Permission::DiscountApprove));
        assert!(!Role::Cashier.has_permission(Permission::CatalogEdit));
        assert!(!Role::Cashier.has_permission(Permission::PricingTool));
    }

    #[test]
    fn test_seller_cannot_touch_cash() {
        assert!(Role::Seller.has_permission(Permission::PdvOperate));
        assert!(!Role::Seller.has_permission(Permission::CashOpenClose));
        assert!(!Role::Seller.has_permission(Permission::DiscountApprove));
        assert_eq!(Role::Seller.permissions().len(), 3);
    }

    #[test]
    fn test_role_parse_accepts_portuguese_names() {
        assert_eq!("gerente".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("CAIXA".parse::<Role>().unwrap(), Role::Cashier);
        assert_eq!("seller".parse::<Role>().unwrap(), Role::Seller);
        assert!("estoquista".parse::<Role>().is_err());
    }

    #[test]
    fn test_permission_serializes_screaming_snake() {
        let json = serde_json::to_string(&Permission::DiscountApprove).unwrap();
        assert_eq!(json, "\"DISCOUNT_APPROVE\"");
    }
}
