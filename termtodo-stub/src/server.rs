//! HTTP surface of the stub service: router, handlers, and server startup.
//!
//! Route map (all bodies JSON):
//!
//! | Route | Op |
//! |---|---|
//! | `POST /v1/auth/signup` | register + sign in |
//! | `POST /v1/auth/signin` | sign in |
//! | `POST /v1/auth/signout` | invalidate the bearer token |
//! | `GET /v1/tasks` | caller's rows, newest first |
//! | `POST /v1/tasks` | insert, returns the finished row |
//! | `PATCH /v1/tasks/{id}` | partial update, returns the row |
//! | `DELETE /v1/tasks/{id}` | delete one row |
//! | `DELETE /v1/tasks/completed` | delete caller's completed rows |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use termtodo_api::auth::{Credentials, Session};
use termtodo_api::task::{ClearedCompleted, NewTask, TaskId, TaskPatch, TaskRecord};
use uuid::Uuid;

use crate::error::StubError;
use crate::state::StubState;

/// Builds the service router over shared state.
#[must_use]
pub fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/v1/auth/signup", post(sign_up))
        .route("/v1/auth/signin", post(sign_in))
        .route("/v1/auth/signout", post(sign_out))
        .route("/v1/tasks", get(list_tasks).post(insert_task))
        .route("/v1/tasks/completed", delete(clear_completed))
        .route("/v1/tasks/{id}", axum::routing::patch(update_task).delete(delete_task))
        .with_state(state)
}

/// Starts the stub service on the given address and returns the bound
/// address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StubState::new())).await
}

/// Starts the stub service with a pre-configured [`StubState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StubState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "stub server error");
        }
    });

    Ok((bound_addr, handle))
}

/// Pulls the bearer token out of the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn sign_up(
    State(state): State<Arc<StubState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Session>, StubError> {
    let session = state.sign_up(&creds.email, &creds.password).await?;
    tracing::info!(email = %creds.email, user_id = %session.user.id, "account registered");
    Ok(Json(session))
}

async fn sign_in(
    State(state): State<Arc<StubState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Session>, StubError> {
    let session = state.sign_in(&creds.email, &creds.password).await?;
    tracing::info!(email = %creds.email, "signed in");
    Ok(Json(session))
}

async fn sign_out(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<StatusCode, StubError> {
    let token = bearer_token(&headers).ok_or(StubError::Unauthorized)?;
    state.authorize(Some(token)).await?;
    state.sign_out(token).await;
    tracing::info!("signed out");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tasks(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<TaskRecord>>, StubError> {
    let user = state.authorize(bearer_token(&headers)).await?;
    let rows = state.list_tasks(user).await;
    tracing::debug!(user_id = %user, count = rows.len(), "listed tasks");
    Ok(Json(rows))
}

async fn insert_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<TaskRecord>), StubError> {
    let user = state.authorize(bearer_token(&headers)).await?;
    let record = state.insert_task(user, new).await?;
    tracing::debug!(user_id = %user, id = %record.id, "task inserted");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskRecord>, StubError> {
    let user = state.authorize(bearer_token(&headers)).await?;
    let record = state
        .update_task(user, TaskId::from_uuid(id), patch)
        .await?;
    tracing::debug!(user_id = %user, id = %record.id, "task updated");
    Ok(Json(record))
}

async fn delete_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StubError> {
    let user = state.authorize(bearer_token(&headers)).await?;
    state.delete_task(user, TaskId::from_uuid(id)).await?;
    tracing::debug!(user_id = %user, id = %id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_completed(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<ClearedCompleted>, StubError> {
    let user = state.authorize(bearer_token(&headers)).await?;
    let cleared = state.clear_completed(user).await;
    tracing::debug!(user_id = %user, count = cleared.deleted.len(), "completed tasks cleared");
    Ok(Json(cleared))
}

/// Starts the stub service in-process for testing.
///
/// Binds to `127.0.0.1:0` (OS-assigned port) and returns the bound address
/// and a [`tokio::task::JoinHandle`] for cleanup.
#[cfg(test)]
pub async fn start_test_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    start_server("127.0.0.1:0")
        .await
        .expect("failed to start test server")
}
