//! Shared request/response types for the `TermTodo` hosted service.

pub mod auth;
pub mod task;
