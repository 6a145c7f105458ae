//! HTTP backend for the hosted tasks service.
//!
//! Thin request/response plumbing over `reqwest`: one method per service
//! endpoint, no retries, no caching. The access token from the last
//! successful sign-in is attached as a bearer header; an optional project
//! API key rides along as `x-api-key` on every request.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use termtodo_api::auth::{AuthUser, Credentials, ErrorBody, Session};
use termtodo_api::task::{ClearedCompleted, NewTask, TaskId, TaskPatch, TaskRecord};

use super::{BackendKind, Remote, RemoteError};

/// Per-request timeout used when the config does not override it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote backed by the hosted tasks service.
pub struct HttpRemote {
    /// Shared connection pool, configured with a per-request timeout.
    client: reqwest::Client,
    /// Service base URL, normalized to end with `/` so joins append.
    base: Url,
    /// Optional project API key, sent as `x-api-key`.
    api_key: Option<String>,
    /// Session from the last successful sign-in, if any.
    session: RwLock<Option<Session>>,
}

impl HttpRemote {
    /// Creates a remote for the service at `server_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(
        server_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let mut base = Url::parse(server_url)
            .map_err(|e| RemoteError::Network(format!("invalid server URL {server_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            api_key,
            session: RwLock::new(None),
        })
    }

    /// The normalized service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves a service path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::Network(format!("invalid endpoint {path}: {e}")))
    }

    /// The current access token, or [`RemoteError::NotSignedIn`].
    fn bearer(&self) -> Result<String, RemoteError> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(RemoteError::NotSignedIn)
    }

    /// Attaches the project API key if one is configured.
    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    /// Sends the request and maps non-success statuses to [`RemoteError::Api`].
    ///
    /// The service reports errors as `{"message": "..."}`; that message is
    /// carried through verbatim. A body that is not in that shape is used
    /// as-is so nothing the service said gets lost.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| {
                if body.is_empty() {
                    format!("service returned {status}")
                } else {
                    body
                }
            },
            |parsed| parsed.message,
        );
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decodes a JSON response body.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn open_session(&self, path: &str, email: &str, password: &str) -> Result<Session, RemoteError> {
        let url = self.endpoint(path)?;
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .execute(self.decorate(self.client.post(url)).json(&body))
            .await?;
        let session: Session = Self::decode(response).await?;
        *self.session.write() = Some(session.clone());
        Ok(session)
    }
}

impl Remote for HttpRemote {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let session = self.open_session("v1/auth/signup", email, password).await?;
        tracing::info!(user = %session.user.email, "signed up");
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let session = self.open_session("v1/auth/signin", email, password).await?;
        tracing::info!(user = %session.user.email, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint("v1/auth/signout")?;
        self.execute(self.decorate(self.client.post(url)).bearer_auth(&token))
            .await?;
        // Only a confirmed revocation drops the session.
        *self.session.write() = None;
        tracing::info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    async fn fetch_tasks(&self) -> Result<Vec<TaskRecord>, RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint("v1/tasks")?;
        let response = self
            .execute(self.decorate(self.client.get(url)).bearer_auth(&token))
            .await?;
        Self::decode(response).await
    }

    async fn insert_task(&self, new: &NewTask) -> Result<TaskRecord, RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint("v1/tasks")?;
        let response = self
            .execute(
                self.decorate(self.client.post(url))
                    .bearer_auth(&token)
                    .json(new),
            )
            .await?;
        Self::decode(response).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<TaskRecord, RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint(&format!("v1/tasks/{id}"))?;
        let response = self
            .execute(
                self.decorate(self.client.patch(url))
                    .bearer_auth(&token)
                    .json(patch),
            )
            .await?;
        Self::decode(response).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint(&format!("v1/tasks/{id}"))?;
        self.execute(self.decorate(self.client.delete(url)).bearer_auth(&token))
            .await?;
        Ok(())
    }

    async fn clear_completed(&self) -> Result<Vec<TaskId>, RemoteError> {
        let token = self.bearer()?;
        let url = self.endpoint("v1/tasks/completed")?;
        let response = self
            .execute(self.decorate(self.client.delete(url)).bearer_auth(&token))
            .await?;
        let cleared: ClearedCompleted = Self::decode(response).await?;
        Ok(cleared.deleted)
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Hosted
    }
}
