//! # PDV Terminal Entry Point
//!
//! ```text
//! main.rs ────► pdv_terminal::run()
//!                 ├── config (defaults ► PDV_CONFIG file ► PDV_* env)
//!                 ├── tracing
//!                 ├── SQLite snapshot store
//!                 ├── backend (HTTP or offline)
//!                 └── command loop on stdin
//! ```

#[tokio::main]
async fn main() {
    if let Err(e) = pdv_terminal::run().await {
        eprintln!("pdv-terminal: {}", e);
        std::process::exit(1);
    }
}
