// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Stateless session handling: token codec + cookie codec.
//!
//! There is no server-side session table. A session is valid while its
//! token's signature verifies and its expiry lies in the future; logging out
//! only tells the client to drop the cookie.
use std::time::Duration;

use axum_extra::extract::cookie::Cookie;
use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;

use super::cookie::{CookieCodec, MAX_COOKIE_BYTES};
use super::identity::Identity;
use super::token::TokenCodec;
use crate::config::{ConfigError, SessionSettings};
use crate::metrics::SESSION_CREATED;

/// Why a session could not be created or recovered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session cookie missing")]
    MissingCookie,

    #[error("malformed session cookie")]
    MalformedCookie,

    #[error("session cookie exceeds {} bytes", MAX_COOKIE_BYTES)]
    CookieTooLarge,

    #[error("session expiry out of range")]
    ExpiryOutOfRange,

    #[error("malformed token")]
    MalformedToken,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl SessionError {
    /// Short label used for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::MissingCookie => "missing_cookie",
            SessionError::MalformedCookie => "malformed_cookie",
            SessionError::CookieTooLarge => "cookie_too_large",
            SessionError::ExpiryOutOfRange => "expiry_out_of_range",
            SessionError::MalformedToken => "malformed_token",
            SessionError::BadSignature => "bad_signature",
            SessionError::Expired => "expired",
            SessionError::InvalidClaims(_) => "invalid_claims",
            SessionError::Signing(_) => "signing",
        }
    }
}

/// Creates, validates and destroys session cookies
#[derive(Clone)]
pub struct SessionService {
    tokens: TokenCodec,
    cookies: CookieCodec,
    token_ttl: Duration,
}

impl SessionService {
    /// Build the service from validated session settings.
    /// Refuses to start without a signing secret.
    pub fn new(settings: &SessionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        Ok(Self {
            tokens: TokenCodec::new(settings.jwt_secret.as_bytes()),
            cookies: CookieCodec::new(settings.cookie_name.clone(), settings.cookie_ttl()),
            token_ttl: settings.jwt_ttl(),
        })
    }

    /// Name of the cookie carrying the session
    pub fn cookie_name(&self) -> &str {
        self.cookies.name()
    }

    /// Issue a token for `identity` and wrap it into a cookie
    pub fn create_session(&self, identity: &Identity) -> Result<Cookie<'static>, SessionError> {
        self.create_session_at(identity, OffsetDateTime::now_utc())
    }

    pub fn create_session_at(
        &self,
        identity: &Identity,
        now: OffsetDateTime,
    ) -> Result<Cookie<'static>, SessionError> {
        let token = self.tokens.issue_at(identity, self.token_ttl, now)?;
        let cookie = self.cookies.wrap_at(&token, now)?;

        counter!(SESSION_CREATED).increment(1);
        tracing::debug!(user_id = %identity.id, "session created");
        Ok(cookie)
    }

    /// Recover the identity behind a session cookie value.
    /// The first failure is returned as-is.
    pub fn validate_session(&self, cookie_value: &str) -> Result<Identity, SessionError> {
        self.validate_session_at(cookie_value, OffsetDateTime::now_utc())
    }

    pub fn validate_session_at(
        &self,
        cookie_value: &str,
        now: OffsetDateTime,
    ) -> Result<Identity, SessionError> {
        let token = self.cookies.unwrap(cookie_value)?;
        let claims = self.tokens.parse_at(&token, now)?;
        Ok(claims.identity())
    }

    /// A cookie that makes the client discard its session.
    ///
    /// Tokens are not revoked server-side: a copied token stays valid until
    /// its own expiry.
    pub fn destroy_session(&self) -> Cookie<'static> {
        self.cookies.expired()
    }
}
