//! `TermTodo` client library: app state, backends, sync, and rendering
//! for a terminal-native to-do list.

pub mod app;
pub mod config;
pub mod remote;
pub mod store;
pub mod sync;
pub mod ui;
