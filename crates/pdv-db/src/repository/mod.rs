//! # Repository Module
//!
//! SQL access, one repository per table.
//!
//! ```text
//! SessionStore (typed, store.rs)
//!      │  serde_json::to_string / from_str
//!      ▼
//! SnapshotRepository (raw JSON text, this module)
//!      │  INSERT .. ON CONFLICT(key) DO UPDATE / SELECT / DELETE
//!      ▼
//! session_snapshots table
//! ```
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`](snapshot::SnapshotRepository) - Keyed JSON snapshots

pub mod snapshot;
