use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use notes_common::Credentials;

use super::identity::Identity;
use crate::error::AppError;

/// Account operations used by the HTTP handlers
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account
    async fn sign_up(&self, credentials: Credentials) -> Result<Identity, AppError>;

    /// Check credentials and open a session
    async fn log_in(&self, credentials: Credentials)
        -> Result<(Identity, Cookie<'static>), AppError>;

    /// The cookie that ends the caller's session
    fn log_out(&self) -> Cookie<'static>;
}
