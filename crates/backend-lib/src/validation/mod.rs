// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use notes_common::NoteDraft;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_NOTE_LENGTH: usize = 10_000;

// Checked after lower-casing
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid note: {0}")]
    InvalidNote(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lower-case a username and check it against the naming rules.
pub fn normalize_username(raw: &str) -> ValidationResult<String> {
    let username = raw.trim().to_lowercase();

    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username must not be empty".to_string(),
        ));
    }

    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(&username) {
        return Err(ValidationError::InvalidUsername(
            "Username may contain only letters, digits, '.', '_' and '-'".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a password at sign-up
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password must not be empty".to_string(),
        ));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate a note before it is stored
pub fn validate_note(draft: &NoteDraft) -> ValidationResult<&NoteDraft> {
    for (field, value) in [("title", &draft.title), ("text", &draft.text)] {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidNote(format!(
                "Note {field} must not be empty"
            )));
        }

        if value.chars().count() > MAX_NOTE_LENGTH {
            return Err(ValidationError::InvalidNote(format!(
                "Note {field} cannot exceed {MAX_NOTE_LENGTH} characters"
            )));
        }
    }

    Ok(draft)
}
