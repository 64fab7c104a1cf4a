//! # pdv-core: Session State Machine for the PDV
//!
//! Everything a checkout does between "open the drawer" and "sale recorded",
//! as plain data and synchronous methods. No I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PDV Architecture                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 pdv-terminal (operator front-end)               │   │
//! │  │    open ──► add ──► discount ──► pay ──► finish ──► close       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands (auth gate, lock, save)       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pdv-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  cash   │ │  cart   │ │ discount │ │ payment │ │ totals │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                 all owned by session::PdvSession                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │             │ snapshot                         │ SaleSubmission         │
//! │  ┌──────────▼──────────────┐      ┌────────────▼────────────────────┐  │
//! │  │ pdv-db (SQLite)         │      │ pdv-client (HTTP backend)       │  │
//! │  └─────────────────────────┘      └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents money type
//! - [`totals`] - Subtotal / discount / total calculation
//! - [`cart`] - Line items of the sale in progress
//! - [`discount`] - Discount request approval workflow
//! - [`cash`] - Cash drawer open/closed state
//! - [`payment`] - Split-tender payment accumulator
//! - [`session`] - The aggregate, including sale finalization
//! - [`permission`] - Role → capability table
//! - [`summary`] - Payment and cash-closing views
//! - [`types`] - Shared records and status enums
//! - [`validation`] - Input rules
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pdv_core::cart::NewLineItem;
//! use pdv_core::{Money, PaymentMethod, PdvSession};
//!
//! let mut session = PdvSession::new();
//! session.open_cash(Money::from_cents(10000)).unwrap();
//! session
//!     .add_item(NewLineItem {
//!         code: "7891000100103".into(),
//!         name: "Cafe 500g".into(),
//!         unit_price: Money::from_cents(1000),
//!         quantity: 3,
//!     })
//!     .unwrap();
//!
//! session.add_payment(PaymentMethod::Pix, Money::from_cents(3000)).unwrap();
//! let finalized = session.finalize_sale().unwrap();
//!
//! assert_eq!(finalized.submission.total.cents(), 3000);
//! assert!(session.cart().is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cash;
pub mod discount;
pub mod error;
pub mod money;
pub mod payment;
pub mod permission;
pub mod session;
pub mod summary;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use permission::{Permission, Role};
pub use session::{FinalizedSale, PdvSession};
pub use totals::Totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key the session snapshot is stored under.
///
/// Bump the suffix when the snapshot layout changes incompatibly; an old
/// snapshot under the previous key is then simply never read.
pub const STORE_KEY: &str = "pdv-store-v1";

/// Maximum length of a line item code (barcodes, SKUs).
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of a line item name.
pub const MAX_NAME_LEN: usize = 200;

/// Largest quantity a single cart line may carry.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest amount, in cents, accepted for a price, discount or payment
/// (R$ 10.000.000,00).
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000;
