//! In-process stand-in for the `TermTodo` hosted service.
//!
//! Serves the same HTTP/JSON contract the real deployment exposes:
//! email/password auth handing out bearer tokens, and a per-user tasks
//! table with server-assigned ids and timestamps. Integration tests spin
//! it up on an OS-assigned port; `termtodo --server` can point at a
//! long-running instance for local development.

pub mod config;
pub mod error;
pub mod server;
pub mod state;
