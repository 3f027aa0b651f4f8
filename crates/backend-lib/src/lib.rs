// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core library of the notes server: sessions, accounts, notes.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, PasswordHasher, SessionService};
use crate::config::{ConfigError, Settings};
use crate::middleware::rate_limit::TokenBucket;
use crate::storage::Storage;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Sign-up, log-in and log-out
    pub auth: Arc<dyn AuthService>,
    /// Session cookie issue and validation
    pub sessions: Arc<SessionService>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    /// Global request admission
    pub rate_limiter: Arc<TokenBucket>,
}

impl<S: Storage + Clone + 'static> AppState<S> {
    /// Build the application state. Fails if the settings are unusable,
    /// most importantly when no signing secret is configured.
    pub fn new(storage: S, settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let sessions = Arc::new(SessionService::new(&settings.session)?);
        let invalid_cost = |e: auth::HashError| ConfigError::Invalid {
            field: "password.scrypt_log_n",
            reason: e.to_string(),
        };
        let hasher = PasswordHasher::new(settings.password.scrypt_log_n).map_err(invalid_cost)?;
        let auth = DefaultAuth::new(storage.clone(), hasher, Arc::clone(&sessions))
            .map_err(invalid_cost)?;

        Ok(Self {
            auth: Arc::new(auth),
            sessions,
            settings: Arc::new(settings.clone()),
            storage,
            rate_limiter: Arc::new(TokenBucket::from_settings(&settings.rate_limit)),
        })
    }
}
