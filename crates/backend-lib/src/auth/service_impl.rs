use std::sync::Arc;

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use metrics::counter;
use notes_common::Credentials;
use zeroize::Zeroize;

use super::identity::{Identity, Username};
use super::password::{HashError, PasswordHasher};
use super::service::AuthService;
use super::session::SessionService;
use crate::error::AppError;
use crate::metrics::{AUTH_LOGIN_FAILED, AUTH_SIGNUP};
use crate::storage::CredentialStore;
use crate::validation::validate_password;

/// Verified against when the user does not exist, so both failure paths
/// cost one hash evaluation.
const DUMMY_PASSWORD: &str = "not-a-real-password";

pub struct DefaultAuth<S> {
    store: S,
    hasher: PasswordHasher,
    sessions: Arc<SessionService>,
    dummy_hash: String,
}

impl<S: CredentialStore> DefaultAuth<S> {
    pub fn new(
        store: S,
        hasher: PasswordHasher,
        sessions: Arc<SessionService>,
    ) -> Result<Self, HashError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            sessions,
            dummy_hash,
        })
    }

    // scrypt is CPU-bound; keep it off the async workers
    async fn hash(&self, mut password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || {
            let hash = hasher.hash(&password);
            password.zeroize();
            hash
        })
        .await??;
        Ok(hash)
    }

    async fn verify(&self, mut password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let ok = tokio::task::spawn_blocking(move || {
            let ok = hasher.verify(&password, &hash);
            password.zeroize();
            ok
        })
        .await?;
        Ok(ok)
    }
}

#[async_trait]
impl<S: CredentialStore> AuthService for DefaultAuth<S> {
    async fn sign_up(&self, credentials: Credentials) -> Result<Identity, AppError> {
        let Credentials {
            username,
            mut password,
        } = credentials;

        let username = match Username::parse(&username) {
            Ok(username) => username,
            Err(e) => {
                password.zeroize();
                return Err(e.into());
            },
        };
        if let Err(e) = validate_password(&password) {
            password.zeroize();
            return Err(e.into());
        }

        let hash = self.hash(password).await?;
        let identity = self.store.put_credential(&username, &hash).await?;

        counter!(AUTH_SIGNUP).increment(1);
        tracing::info!(user_id = %identity.id, username = %identity.username, "user signed up");
        Ok(identity)
    }

    async fn log_in(
        &self,
        credentials: Credentials,
    ) -> Result<(Identity, Cookie<'static>), AppError> {
        let Credentials { username, password } = credentials;

        let record = match Username::parse(&username) {
            Ok(username) => self.store.get_credential(&username).await?,
            Err(_) => None,
        };

        let (identity, hash) = match record {
            Some(record) => (Some(record.identity()), record.password_hash),
            None => (None, self.dummy_hash.clone()),
        };

        let verified = self.verify(password, hash).await?;
        let identity = match identity {
            Some(identity) if verified => identity,
            _ => {
                counter!(AUTH_LOGIN_FAILED).increment(1);
                tracing::info!("login rejected");
                return Err(AppError::InvalidCredentials);
            },
        };

        let cookie = self
            .sessions
            .create_session(&identity)
            .map_err(AppError::Session)?;

        tracing::info!(user_id = %identity.id, "user logged in");
        Ok((identity, cookie))
    }

    fn log_out(&self) -> Cookie<'static> {
        self.sessions.destroy_session()
    }
}
