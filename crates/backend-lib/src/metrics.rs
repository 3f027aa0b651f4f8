// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_REJECTED: &str = "session.rejected";
pub const AUTH_SIGNUP: &str = "auth.signup";
pub const AUTH_LOGIN_FAILED: &str = "auth.login_failed";
pub const RATE_LIMIT_REJECTED: &str = "rate_limit.rejected";
pub const NOTE_CREATED: &str = "note.created";
