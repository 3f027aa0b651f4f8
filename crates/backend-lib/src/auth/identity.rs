// ============================
// crates/backend-lib/src/auth/identity.rs
// ============================
//! Authenticated identity types.
use std::fmt;

use notes_common::UserInfo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{normalize_username, ValidationError};

/// A username that has been lower-cased and checked against the naming rules.
///
/// Every comparison and every lookup goes through this type, so two
/// spellings that differ only in case always resolve to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalize and validate a raw username
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        normalize_username(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a request is acting as. Immutable once issued by the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: Username,
}

impl Identity {
    pub fn new(id: Uuid, username: Username) -> Self {
        Self { id, username }
    }
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        UserInfo {
            id: identity.id,
            username: identity.username.to_string(),
        }
    }
}
