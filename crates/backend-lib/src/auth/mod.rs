// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod cookie;
pub mod identity;
pub mod password;
pub mod session;
pub mod token;
mod service;
mod service_impl;

pub use cookie::{CookieCodec, DEFAULT_COOKIE_NAME, MAX_COOKIE_BYTES};
pub use identity::{Identity, Username};
pub use password::{HashError, PasswordHasher};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{SessionError, SessionService};
pub use token::{SessionClaims, TokenCodec};
