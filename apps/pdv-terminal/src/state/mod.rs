//! # State Module
//!
//! Application state for the terminal.
//!
//! Each concern gets its own state type, and each command takes only the
//! ones it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌────────────┐ ┌──────────────┐ ┌──────────┐ ┌────────────┐ ┌────────┐ │
//! │  │ AuthState  │ │ SessionState │ │ DbState  │ │ Backend    │ │ Config │ │
//! │  │            │ │              │ │          │ │ State      │ │ State  │ │
//! │  │ Arc<Mutex< │ │ Arc<Mutex<   │ │ SQLite   │ │ Arc<dyn    │ │ read   │ │
//! │  │  User>>    │ │  PdvSession>>│ │ pool     │ │ PdvBackend>│ │ only   │ │
//! │  └────────────┘ └──────────────┘ └──────────┘ └────────────┘ └────────┘ │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Auth/Session: Arc<Mutex<T>>, never locked across an .await          │
//! │  • DbState: connection pool is thread-safe                             │
//! │  • BackendState/ConfigState: read-only after startup                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod backend;
mod config;
mod db;
mod session;

pub use auth::{AuthState, User};
pub use backend::BackendState;
pub use config::{ConfigError, ConfigState};
pub use db::DbState;
pub use session::SessionState;
