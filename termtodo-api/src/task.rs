//! Task record types shared by the `TermTodo` client and the hosted service.
//!
//! The hosted table owns row identity and timestamps: clients send
//! [`NewTask`] / [`TaskPatch`] requests and receive finished [`TaskRecord`]
//! rows back. Text validation lives here so the client and the service
//! enforce the same rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::UserId;

/// Default maximum task text length in characters.
pub const MAX_TASK_TEXT_LENGTH: usize = 256;

/// Unique identifier for a task row, assigned by the service at insert time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a fresh random task identifier (UUID v4).
    ///
    /// Only the service side mints ids; clients treat them as opaque.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that reject task text before it reaches the service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskTextError {
    /// Text is empty or whitespace-only after trimming.
    #[error("task text cannot be empty")]
    Empty,
    /// Text exceeds the maximum length.
    #[error("task text too long (max {max} characters)")]
    TooLong {
        /// The limit that was exceeded.
        max: usize,
    },
}

/// Trims `text` and validates it against the shared rules.
///
/// Returns the trimmed text on success.
///
/// # Errors
///
/// Returns [`TaskTextError::Empty`] if nothing remains after trimming, or
/// [`TaskTextError::TooLong`] if the trimmed text exceeds `max` characters.
pub fn normalize_text(text: &str, max: usize) -> Result<String, TaskTextError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskTextError::Empty);
    }
    if trimmed.chars().count() > max {
        return Err(TaskTextError::TooLong { max });
    }
    Ok(trimmed.to_string())
}

/// One row of the hosted tasks table.
///
/// `updated_at` and `user_id` are populated by the multi-user service and
/// absent for rows held by the local single-user backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Server-assigned unique row id.
    pub id: TaskId,
    /// Trimmed, non-empty task text.
    pub text: String,
    /// Completion flag.
    pub completed: bool,
    /// Server-assigned creation time; never changes afterwards.
    pub created_at: DateTime<Utc>,
    /// Refreshed by the service on every text or completion change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning user; rows are only ever visible to their owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Insert request. The service assigns `id`, `created_at`, and ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Trimmed task text.
    pub text: String,
    /// Initial completion flag; new tasks start incomplete.
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    /// Creates an insert request for `text` with `completed` false.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self {
            text,
            completed: false,
        }
    }
}

/// Partial update targeting one row by id. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement text, already trimmed and validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only changes the completion flag.
    #[must_use]
    pub const fn with_completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// A patch that only changes the text.
    #[must_use]
    pub const fn with_text(text: String) -> Self {
        Self {
            text: Some(text),
            completed: None,
        }
    }
}

/// Response to a clear-completed request: the ids the service removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedCompleted {
    /// Every row deleted by the request, possibly empty.
    pub deleted: Vec<TaskId>,
}
