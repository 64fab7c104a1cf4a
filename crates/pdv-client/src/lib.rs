//! # pdv-client: ERP Backend Boundary
//!
//! Sale submission, cash drawer reporting and payment status lookups.
//!
//! ```text
//! pdv-terminal command
//!      │  (session lock already released)
//!      ▼
//! Arc<dyn PdvBackend>
//!      ├── HttpBackend ──► HttpClient ──► reqwest ──► ERP /api/...
//!      └── OfflineBackend (no network, always fallback)
//!      │
//!      ▼
//! RemoteOutcome::Confirmed(value) | RemoteOutcome::Fallback { value, reason }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod outcome;

pub use backend::{HttpBackend, OfflineBackend, PdvBackend};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use outcome::RemoteOutcome;
