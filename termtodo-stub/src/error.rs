//! Service error type and its HTTP mapping.
//!
//! Every failure leaves the service as a non-2xx status with an
//! [`ErrorBody`] JSON payload; clients show the message verbatim.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use termtodo_api::auth::ErrorBody;
use thiserror::Error;

/// Errors returned by the stub service's endpoints.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StubError {
    /// Request lacked a valid bearer token.
    #[error("missing or invalid access token")]
    Unauthorized,
    /// Sign-in with unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Sign-up with an email that already has an account.
    #[error("email already registered")]
    EmailTaken,
    /// Request body failed validation.
    #[error("{0}")]
    BadRequest(String),
    /// No row with the given id in the caller's scope.
    #[error("task not found")]
    TaskNotFound,
}

impl StubError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::TaskNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody::new(self.to_string()));
        (status, body).into_response()
    }
}
