//! Coordinator wiring the TUI to the async remote backend.
//!
//! This module bridges the synchronous TUI event loop (crossterm
//! poll-based) with the async [`Remote`] backend. A background tokio task
//! owns the remote and communicates with the main thread via
//! [`SyncCommand`] / [`SyncEvent`] channels.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── SyncEvent ───  tokio background task
//!                     ─── SyncCommand →
//! ```
//!
//! Every command produces exactly one event: the confirmation on success,
//! or [`SyncEvent::Failed`] carrying the backend's error. The main loop
//! applies mirror changes only when a confirmation arrives, so the board
//! never shows a write the service has not accepted.

use tokio::sync::mpsc;

use termtodo_api::auth::Session;
use termtodo_api::task::{NewTask, TaskId, TaskPatch, TaskRecord};

use crate::remote::{Remote, RemoteError};

/// Commands sent from the TUI main loop to the sync task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the full task list.
    Load,
    /// Create a task with the given (already validated) text.
    Add {
        /// Trimmed task text.
        text: String,
    },
    /// Set a task's completion state to `completed`.
    Toggle {
        /// Target task.
        id: TaskId,
        /// Desired state, computed from the mirror at keypress time.
        completed: bool,
    },
    /// Rewrite a task's text.
    Edit {
        /// Target task.
        id: TaskId,
        /// Trimmed replacement text.
        text: String,
    },
    /// Delete one task.
    Delete {
        /// Target task.
        id: TaskId,
    },
    /// Delete every completed task.
    ClearCompleted,
    /// Register an account and open a session.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Open a session for an existing account.
    SignIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// End the current session.
    SignOut,
    /// Gracefully stop the sync task.
    Shutdown,
}

/// Which operation an event is answering. Used for log context and for
/// routing failures to the right part of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Full list fetch.
    Load,
    /// Task creation.
    Add,
    /// Completion toggle.
    Toggle,
    /// Text rewrite.
    Edit,
    /// Single-task delete.
    Delete,
    /// Bulk delete of completed tasks.
    ClearCompleted,
    /// Account registration.
    SignUp,
    /// Session open.
    SignIn,
    /// Session close.
    SignOut,
}

impl OpKind {
    /// Whether this operation belongs to the session gate rather than
    /// the board.
    #[must_use]
    pub const fn is_auth(self) -> bool {
        matches!(self, Self::SignUp | Self::SignIn)
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Toggle => "toggle",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::ClearCompleted => "clear-completed",
            Self::SignUp => "sign-up",
            Self::SignIn => "sign-in",
            Self::SignOut => "sign-out",
        };
        f.write_str(name)
    }
}

/// Events sent from the sync task back to the TUI main loop.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A full snapshot arrived; the mirror adopts it wholesale.
    Loaded {
        /// Rows in server order, newest first.
        tasks: Vec<TaskRecord>,
    },
    /// The service stored a new task.
    Added {
        /// The row as stored, including its minted ID.
        task: TaskRecord,
    },
    /// The service stored an update (toggle or edit).
    Updated {
        /// The row as stored afterwards.
        task: TaskRecord,
    },
    /// The service deleted one task.
    Removed {
        /// ID of the row that went away.
        id: TaskId,
    },
    /// The service deleted every completed task.
    CompletedCleared {
        /// IDs of the rows that went away.
        ids: Vec<TaskId>,
    },
    /// A session opened (sign-in or sign-up).
    SignedIn {
        /// The opened session.
        session: Session,
    },
    /// The session ended.
    SignedOut,
    /// An operation failed; the mirror must stay as it was.
    Failed {
        /// Which operation failed.
        op: OpKind,
        /// The backend's error, `Display`ed verbatim in the banner.
        error: RemoteError,
    },
}

/// Default capacity for the command and event channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Spawns the sync background task and returns the channel handles.
///
/// The spawned task takes ownership of `remote` and runs until it sees
/// [`SyncCommand::Shutdown`] or the TUI drops its end of a channel.
pub fn spawn_sync<R>(
    remote: R,
    channel_capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>)
where
    R: Remote + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(channel_capacity);

    tokio::spawn(async move {
        command_handler(remote, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: execute commands against the remote, one at a time.
///
/// Commands run sequentially in arrival order, so confirmations come back
/// in the same order the user acted.
async fn command_handler<R: Remote>(
    remote: R,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            SyncCommand::Load => match remote.fetch_tasks().await {
                Ok(tasks) => SyncEvent::Loaded { tasks },
                Err(error) => failure(OpKind::Load, error),
            },
            SyncCommand::Add { text } => match remote.insert_task(&NewTask::new(text)).await {
                Ok(task) => SyncEvent::Added { task },
                Err(error) => failure(OpKind::Add, error),
            },
            SyncCommand::Toggle { id, completed } => {
                match remote
                    .update_task(id, &TaskPatch::with_completed(completed))
                    .await
                {
                    Ok(task) => SyncEvent::Updated { task },
                    Err(error) => failure(OpKind::Toggle, error),
                }
            }
            SyncCommand::Edit { id, text } => {
                match remote.update_task(id, &TaskPatch::with_text(text)).await {
                    Ok(task) => SyncEvent::Updated { task },
                    Err(error) => failure(OpKind::Edit, error),
                }
            }
            SyncCommand::Delete { id } => match remote.delete_task(id).await {
                Ok(()) => SyncEvent::Removed { id },
                Err(error) => failure(OpKind::Delete, error),
            },
            SyncCommand::ClearCompleted => match remote.clear_completed().await {
                Ok(ids) => SyncEvent::CompletedCleared { ids },
                Err(error) => failure(OpKind::ClearCompleted, error),
            },
            SyncCommand::SignUp { email, password } => {
                match remote.sign_up(&email, &password).await {
                    Ok(session) => SyncEvent::SignedIn { session },
                    Err(error) => failure(OpKind::SignUp, error),
                }
            }
            SyncCommand::SignIn { email, password } => {
                match remote.sign_in(&email, &password).await {
                    Ok(session) => SyncEvent::SignedIn { session },
                    Err(error) => failure(OpKind::SignIn, error),
                }
            }
            SyncCommand::SignOut => match remote.sign_out().await {
                Ok(()) => SyncEvent::SignedOut,
                Err(error) => failure(OpKind::SignOut, error),
            },
            SyncCommand::Shutdown => {
                tracing::info!("sync command handler shutting down");
                break;
            }
        };

        if evt_tx.send(event).await.is_err() {
            // TUI dropped; exit.
            break;
        }
    }
}

fn failure(op: OpKind, error: RemoteError) -> SyncEvent {
    tracing::warn!(%op, error = %error, "remote operation failed");
    SyncEvent::Failed { op, error }
}
