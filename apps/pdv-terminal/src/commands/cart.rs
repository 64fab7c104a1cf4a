//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payments │────►│ Pending  │       │
//! │  │  Cart    │     │          │     │          │     │  Sale    │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │            │
//! │                   add_item                          finish_sale        │
//! │                   update_quantity                   (sale.rs)          │
//! │                   remove_item                                          │
//! │                   apply_discount                                       │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_sale ─────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating command returns the whole cart so the front-end can
//! redraw from one response.

use pdv_core::cart::NewLineItem;
use pdv_core::{Customer, LineItem, Money, PdvSession, Permission, Totals};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::commit;
use crate::error::ApiError;
use crate::state::{AuthState, DbState, SessionState};

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub customer: Option<Customer>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub totals: Totals,
}

impl From<&PdvSession> for CartResponse {
    fn from(session: &PdvSession) -> Self {
        let cart = session.cart();
        CartResponse {
            items: cart.items().to_vec(),
            customer: session.customer().cloned(),
            item_count: cart.len(),
            total_quantity: cart.total_quantity(),
            totals: cart.totals(),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(session: &SessionState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    session.with_session(|s| CartResponse::from(s))
}

/// Adds a line to the cart.
///
/// ## Behavior
/// - Always a new line, even for a code already in the cart
/// - Quantity below 1 becomes 1, a negative price becomes 0
/// - A blank code or name is filled from the other; both blank is refused
pub async fn add_item(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    input: NewLineItem,
) -> Result<CartResponse, ApiError> {
    debug!(code = %input.code, price = %input.unit_price, qty = input.quantity, "add_item command");
    auth.require(Permission::PdvOperate)?;

    let (id, cart) = commit(session, db, |s| {
        let id = s.add_item(input)?;
        Ok((id, CartResponse::from(&*s)))
    })
    .await?;

    info!(item_id = %id, total = %cart.totals.total, "Item added to cart");
    Ok(cart)
}

/// Removes a line from the cart.
pub async fn remove_item(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    item_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %item_id, "remove_item command");
    auth.require(Permission::PdvOperate)?;

    commit(session, db, |s| {
        if !s.remove_item(item_id) {
            return Err(ApiError::not_found("Item", item_id));
        }
        Ok(CartResponse::from(&*s))
    })
    .await
}

/// Sets a line's quantity. Negative becomes zero; zero keeps the line.
pub async fn update_quantity(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    item_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %item_id, qty = quantity, "update_quantity command");
    auth.require(Permission::PdvOperate)?;

    commit(session, db, |s| {
        if !s.update_quantity(item_id, quantity)? {
            return Err(ApiError::not_found("Item", item_id));
        }
        Ok(CartResponse::from(&*s))
    })
    .await
}

/// Sets a line's per-unit discount directly, bypassing the request flow.
///
/// Needs `DISCOUNT_APPROVE`; cashiers go through `request_discount`.
pub async fn apply_discount(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    item_id: &str,
    per_unit: Money,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %item_id, per_unit = %per_unit, "apply_discount command");
    let user = auth.require(Permission::DiscountApprove)?;

    let cart = commit(session, db, |s| {
        if !s.apply_discount(item_id, per_unit)? {
            return Err(ApiError::not_found("Item", item_id));
        }
        Ok(CartResponse::from(&*s))
    })
    .await?;

    info!(item_id = %item_id, per_unit = %per_unit, by = %user.id, "Discount applied");
    Ok(cart)
}

/// Links a customer to the sale, or unlinks it when `name` is blank.
///
/// The customer id is the document when given, else the name.
pub async fn set_customer(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
    name: &str,
    document: Option<&str>,
) -> Result<CartResponse, ApiError> {
    auth.require(Permission::PdvOperate)?;

    let name = name.trim();
    let document = document.map(str::trim).filter(|d| !d.is_empty());
    let customer = (!name.is_empty()).then(|| Customer {
        id: document.unwrap_or(name).to_string(),
        name: name.to_string(),
        document: document.map(str::to_string),
    });

    debug!(customer = ?customer.as_ref().map(|c| &c.id), "set_customer command");

    commit(session, db, |s| {
        s.set_customer(customer);
        Ok(CartResponse::from(&*s))
    })
    .await
}

/// Empties the cart, payments and customer. The drawer stays as it is.
pub async fn clear_sale(
    auth: &AuthState,
    session: &SessionState,
    db: &DbState,
) -> Result<CartResponse, ApiError> {
    debug!("clear_sale command");
    auth.require(Permission::PdvOperate)?;

    commit(session, db, |s| {
        s.clear_sale();
        Ok(CartResponse::from(&*s))
    })
    .await
}
