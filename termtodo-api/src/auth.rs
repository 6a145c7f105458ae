//! Identity types for the hosted service's auth endpoints.
//!
//! Sign-in and sign-up exchange [`Credentials`] for a [`Session`]; the
//! session's bearer token authenticates every task request afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a fresh random user identifier (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `UserId` from an existing UUID.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sign-in / sign-up request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password, sent only to the auth endpoints.
    pub password: String,
}

/// The signed-in user as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user id; task rows reference it as their owner.
    pub id: UserId,
    /// Email the account was registered with.
    pub email: String,
}

/// A resolved identity: bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token for the `Authorization` header.
    pub access_token: String,
    /// The authenticated user.
    pub user: AuthUser,
}

/// Error body carried by every non-2xx service response.
///
/// The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub message: String,
}

impl ErrorBody {
    /// Wraps a message into an error body.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}
