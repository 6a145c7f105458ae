//! Shared service state: user accounts, live sessions, and the tasks table.
//!
//! Everything lives behind one [`tokio::sync::RwLock`]; the service is a
//! test fixture and a dev convenience, not a production store. The table
//! semantics mirror the hosted deployment: ids and timestamps are assigned
//! here, rows are scoped to their owner, and text is validated again on
//! the way in.

use std::collections::HashMap;

use chrono::Utc;
use termtodo_api::auth::{AuthUser, Session, UserId};
use termtodo_api::task::{
    self, ClearedCompleted, MAX_TASK_TEXT_LENGTH, NewTask, TaskId, TaskPatch, TaskRecord,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StubError;

/// Minimum accepted password length for sign-up.
const MIN_PASSWORD_LENGTH: usize = 6;

/// One registered account.
struct UserEntry {
    id: UserId,
    email: String,
    password: String,
}

#[derive(Default)]
struct Inner {
    /// Registered accounts, in sign-up order.
    users: Vec<UserEntry>,
    /// Bearer token -> owning user.
    sessions: HashMap<String, UserId>,
    /// All rows across all users, in insertion order.
    tasks: Vec<TaskRecord>,
}

/// Shared stub service state.
pub struct StubState {
    inner: RwLock<Inner>,
    /// Maximum accepted task text length in characters.
    max_text_len: usize,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    /// Creates an empty state with the default text length limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MAX_TASK_TEXT_LENGTH)
    }

    /// Creates an empty state with a custom text length limit.
    #[must_use]
    pub fn with_config(max_text_len: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_text_len,
        }
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::EmailTaken`] for a duplicate email and
    /// [`StubError::BadRequest`] for a malformed email or short password.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, StubError> {
        if !email.contains('@') {
            return Err(StubError::BadRequest("invalid email address".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StubError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StubError::EmailTaken);
        }

        let user_id = UserId::new();
        inner.users.push(UserEntry {
            id: user_id,
            email: email.to_string(),
            password: password.to_string(),
        });

        Ok(open_session(&mut inner, user_id, email))
    }

    /// Exchanges credentials for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::InvalidCredentials`] for an unknown email or a
    /// wrong password; the two cases are indistinguishable to the caller.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StubError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(StubError::InvalidCredentials)?;

        let user_id = user.id;
        let email = user.email.clone();
        Ok(open_session(&mut inner, user_id, &email))
    }

    /// Invalidates the session behind `token`.
    pub async fn sign_out(&self, token: &str) {
        let mut inner = self.inner.write().await;
        inner.sessions.remove(token);
    }

    /// Resolves a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Unauthorized`] for a missing or unknown token.
    pub async fn authorize(&self, token: Option<&str>) -> Result<UserId, StubError> {
        let token = token.ok_or(StubError::Unauthorized)?;
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(token)
            .copied()
            .ok_or(StubError::Unauthorized)
    }

    /// All of `user`'s rows, newest creation first.
    pub async fn list_tasks(&self, user: UserId) -> Vec<TaskRecord> {
        let inner = self.inner.read().await;
        let mut rows: Vec<TaskRecord> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == Some(user))
            .cloned()
            .collect();
        // Stable sort on a reversed insertion order keeps the later insert
        // first when two rows share a timestamp.
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Inserts a row for `user` and returns it with id and timestamps set.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::BadRequest`] if the text fails validation.
    pub async fn insert_task(&self, user: UserId, new: NewTask) -> Result<TaskRecord, StubError> {
        let text = task::normalize_text(&new.text, self.max_text_len)
            .map_err(|e| StubError::BadRequest(e.to_string()))?;

        let now = Utc::now();
        let record = TaskRecord {
            id: TaskId::new(),
            text,
            completed: new.completed,
            created_at: now,
            updated_at: Some(now),
            user_id: Some(user),
        };

        let mut inner = self.inner.write().await;
        inner.tasks.push(record.clone());
        Ok(record)
    }

    /// Applies a patch to `user`'s row `id` and returns the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::TaskNotFound`] if no such row exists in the
    /// caller's scope, or [`StubError::BadRequest`] for invalid text.
    pub async fn update_task(
        &self,
        user: UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<TaskRecord, StubError> {
        let text = patch
            .text
            .map(|t| task::normalize_text(&t, self.max_text_len))
            .transpose()
            .map_err(|e| StubError::BadRequest(e.to_string()))?;

        let mut inner = self.inner.write().await;
        let row = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == Some(user))
            .ok_or(StubError::TaskNotFound)?;

        if let Some(text) = text {
            row.text = text;
        }
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    /// Deletes `user`'s row `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::TaskNotFound`] if no such row exists in the
    /// caller's scope.
    pub async fn delete_task(&self, user: UserId, id: TaskId) -> Result<(), StubError> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| !(t.id == id && t.user_id == Some(user)));
        if inner.tasks.len() == before {
            return Err(StubError::TaskNotFound);
        }
        Ok(())
    }

    /// Deletes all of `user`'s completed rows and reports which ones went.
    pub async fn clear_completed(&self, user: UserId) -> ClearedCompleted {
        let mut inner = self.inner.write().await;
        let deleted: Vec<TaskId> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == Some(user) && t.completed)
            .map(|t| t.id)
            .collect();
        inner
            .tasks
            .retain(|t| !(t.user_id == Some(user) && t.completed));
        ClearedCompleted { deleted }
    }
}

/// Mints a bearer token, records the session, and builds the response.
fn open_session(inner: &mut Inner, user_id: UserId, email: &str) -> Session {
    let token = Uuid::new_v4().simple().to_string();
    inner.sessions.insert(token.clone(), user_id);
    Session {
        access_token: token,
        user: AuthUser {
            id: user_id,
            email: email.to_string(),
        },
    }
}
