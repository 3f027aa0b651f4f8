// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between note clients and the server.
//! This module defines the JSON request and response bodies of the HTTP API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page size used when listing notes
pub const NOTES_PAGE_SIZE: usize = 10;

/// Username/password pair sent to `/signup` and `/login`
#[derive(Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Login name (normalized to lower case by the server)
    pub username: String,
    /// Plaintext password
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Never print the password, not even in debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of an authenticated user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Server-generated user id
    pub id: Uuid,
    /// Normalized username
    pub username: String,
}

/// Note body submitted by a client
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
}

/// A stored note
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Note {
    /// Note id
    pub id: Uuid,
    /// Owner id
    pub user_id: Uuid,
    /// Owner username at creation time
    pub username: String,
    pub title: String,
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Error payload returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
