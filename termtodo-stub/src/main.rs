//! `TermTodo` stub service -- a tiny hosted-backend stand-in.
//!
//! An axum HTTP server exposing the auth and tasks endpoints the
//! `termtodo` client expects from its hosted deployment. State is held
//! in memory and vanishes on exit; use it for local development and
//! demos, not for real lists.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9100
//! cargo run --bin termtodo-stub
//!
//! # Run on custom address
//! cargo run --bin termtodo-stub -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! TERMTODO_STUB_ADDR=127.0.0.1:8080 cargo run --bin termtodo-stub
//! ```

use std::sync::Arc;

use clap::Parser;
use termtodo_stub::config::{StubCliArgs, StubConfig};
use termtodo_stub::server;
use termtodo_stub::state::StubState;

#[tokio::main]
async fn main() {
    let cli = StubCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match StubConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting termtodo stub service");

    let state = Arc::new(StubState::with_config(config.max_task_text_len));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "stub service listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "stub service task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start stub service");
            std::process::exit(1);
        }
    }
}
