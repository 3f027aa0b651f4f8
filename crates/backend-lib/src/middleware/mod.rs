// crates/backend-lib/src/middleware/mod.rs

//! Request filters: session gate and admission control.

pub mod auth;
pub mod rate_limit;

pub use auth::{require_session, CurrentUser};
pub use rate_limit::{rate_limit, TokenBucket};
