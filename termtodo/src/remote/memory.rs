//! In-process backend for single-user use and for tests.
//!
//! Holds the tasks table in a [`parking_lot::Mutex`] and answers every
//! operation without touching the network. Task operations work with no
//! session at all, matching the single-user setup where the board is the
//! whole app. The auth operations still behave like the hosted service
//! so the session gate can be exercised against this backend too.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use termtodo_api::auth::{AuthUser, Session, UserId};
use termtodo_api::task::{
    MAX_TASK_TEXT_LENGTH, NewTask, TaskId, TaskPatch, TaskRecord, normalize_text,
};

use super::{BackendKind, Remote, RemoteError};

/// Minimum accepted password length, matching the hosted service.
const MIN_PASSWORD_LENGTH: usize = 6;

/// A registered account: email, password, minted ID.
struct Account {
    email: String,
    password: String,
    id: UserId,
}

struct Inner {
    accounts: Vec<Account>,
    session: Option<Session>,
    /// Task rows in insertion order, oldest first.
    rows: Vec<TaskRecord>,
    /// One-shot injected failure, consumed by the next operation.
    fail_next: Option<RemoteError>,
}

/// Remote backed by an in-process table.
///
/// Clones share one table, so a test can keep a handle for seeding and
/// failure injection while the sync pipeline owns another.
#[derive(Clone)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Inner>>,
    max_text_len: usize,
}

impl MemoryRemote {
    /// Creates an empty in-process table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_text_len(MAX_TASK_TEXT_LENGTH)
    }

    /// Creates an empty table with a custom text length limit.
    #[must_use]
    pub fn with_max_text_len(max_text_len: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                accounts: Vec::new(),
                session: None,
                rows: Vec::new(),
                fail_next: None,
            })),
            max_text_len,
        }
    }

    /// Makes the next operation fail with `error` instead of touching the
    /// table. One-shot: the operation after that behaves normally again.
    pub fn fail_next(&self, error: RemoteError) {
        self.inner.lock().fail_next = Some(error);
    }

    fn take_failure(inner: &mut Inner) -> Result<(), RemoteError> {
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn open_session(inner: &mut Inner, id: UserId, email: String) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().simple().to_string(),
            user: AuthUser { id, email },
        };
        inner.session = Some(session.clone());
        session
    }

    fn normalize(&self, text: &str) -> Result<String, RemoteError> {
        normalize_text(text, self.max_text_len).map_err(|e| RemoteError::Api {
            status: 400,
            message: e.to_string(),
        })
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl Remote for MemoryRemote {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        if !email.contains('@') {
            return Err(RemoteError::Api {
                status: 400,
                message: "invalid email address".to_string(),
            });
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RemoteError::Api {
                status: 400,
                message: format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            });
        }
        if inner.accounts.iter().any(|a| a.email == email) {
            return Err(RemoteError::Api {
                status: 409,
                message: "email already registered".to_string(),
            });
        }

        let id = UserId::new();
        inner.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            id,
        });
        Ok(Self::open_session(&mut inner, id, email.to_string()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let id = inner
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .map(|a| a.id)
            .ok_or_else(|| RemoteError::Api {
                status: 401,
                message: "invalid email or password".to_string(),
            })?;
        Ok(Self::open_session(&mut inner, id, email.to_string()))
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        if inner.session.take().is_none() {
            return Err(RemoteError::NotSignedIn);
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.inner.lock().session.as_ref().map(|s| s.user.clone())
    }

    async fn fetch_tasks(&self) -> Result<Vec<TaskRecord>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let mut rows = inner.rows.clone();
        // Newest first; reversing before the stable sort keeps later
        // insertions ahead of earlier ones on equal timestamps.
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_task(&self, new: &NewTask) -> Result<TaskRecord, RemoteError> {
        let text = self.normalize(&new.text)?;

        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let row = TaskRecord {
            id: TaskId::new(),
            text,
            completed: new.completed,
            created_at: Utc::now(),
            updated_at: None,
            user_id: None,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<TaskRecord, RemoteError> {
        let text = patch
            .text
            .as_deref()
            .map(|t| self.normalize(t))
            .transpose()?;

        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RemoteError::Api {
                status: 404,
                message: "task not found".to_string(),
            })?;
        if let Some(text) = text {
            row.text = text;
        }
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }
        Ok(row.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        if inner.rows.len() == before {
            return Err(RemoteError::Api {
                status: 404,
                message: "task not found".to_string(),
            });
        }
        Ok(())
    }

    async fn clear_completed(&self) -> Result<Vec<TaskId>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let deleted: Vec<TaskId> = inner
            .rows
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.id)
            .collect();
        inner.rows.retain(|r| !r.completed);
        Ok(deleted)
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
