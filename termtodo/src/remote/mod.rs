//! Remote collaborator abstraction over the hosted tasks service.
//!
//! The hosted tasks table is opaque to the client: every durable change
//! goes through one of the operations on the [`Remote`] trait, and the
//! local mirror only updates once the call comes back `Ok`. Two backends
//! exist: [`HttpRemote`] speaks to the hosted service, [`MemoryRemote`]
//! keeps everything in process for single-user use and for tests.

use std::future::Future;

use termtodo_api::auth::{AuthUser, Session};
use termtodo_api::task::{NewTask, TaskId, TaskPatch, TaskRecord};

pub mod http;
pub mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

/// Which kind of backend the client is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The hosted multi-user service, reached over HTTP.
    Hosted,
    /// The in-process single-user table.
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosted => write!(f, "Hosted"),
            Self::Local => write!(f, "Local"),
        }
    }
}

/// Errors surfaced by remote operations.
///
/// The `Display` form of every variant is what ends up in the error
/// banner, so service messages pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code as reported by the service.
        status: u16,
        /// The service's own message, passed through unchanged.
        message: String,
    },
    /// The request never completed (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The response arrived but could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
    /// A task operation was attempted without a signed-in session.
    #[error("not signed in")]
    NotSignedIn,
}

/// The five task operations plus the identity contract.
///
/// Implementations hold their own session state: a successful `sign_in`
/// or `sign_up` makes the task operations work, `sign_out` revokes them.
/// Every operation is a single attempt; callers decide what a failure
/// means, never the backend.
pub trait Remote: Send + Sync {
    /// Registers a new account and opens a session for it.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, RemoteError>> + Send;

    /// Opens a session for an existing account.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, RemoteError>> + Send;

    /// Ends the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Fetches the signed-in user's tasks, newest first.
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<TaskRecord>, RemoteError>> + Send;

    /// Creates a task and returns the stored row.
    fn insert_task(
        &self,
        new: &NewTask,
    ) -> impl Future<Output = Result<TaskRecord, RemoteError>> + Send;

    /// Applies a partial update and returns the row as stored afterwards.
    fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<TaskRecord, RemoteError>> + Send;

    /// Deletes one task.
    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Deletes every completed task, returning the IDs that went away.
    fn clear_completed(&self) -> impl Future<Output = Result<Vec<TaskId>, RemoteError>> + Send;

    /// Which backend this remote talks to.
    fn backend_kind(&self) -> BackendKind;
}
