// ============================
// crates/backend-lib/src/auth/cookie.rs
// ============================
//! Transport wrapping of session tokens into cookies.
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use time::OffsetDateTime;

use super::session::SessionError;

/// Upper bound on the serialized `Set-Cookie` value
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Default session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

/// Wraps token strings into `HttpOnly; Secure; SameSite=Lax` cookies
#[derive(Debug, Clone)]
pub struct CookieCodec {
    name: String,
    ttl: Duration,
}

impl CookieCodec {
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode `token` into a session cookie expiring `ttl` after `now`
    pub fn wrap_at(&self, token: &str, now: OffsetDateTime) -> Result<Cookie<'static>, SessionError> {
        let expires = time::Duration::try_from(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(SessionError::ExpiryOutOfRange)?;
        let value = URL_SAFE.encode(token.as_bytes());
        let cookie = self.build(value, expires);

        // `to_string` is exactly what goes out in `Set-Cookie`
        if cookie.to_string().len() > MAX_COOKIE_BYTES {
            return Err(SessionError::CookieTooLarge);
        }
        Ok(cookie)
    }

    pub fn wrap(&self, token: &str) -> Result<Cookie<'static>, SessionError> {
        self.wrap_at(token, OffsetDateTime::now_utc())
    }

    /// Recover the token string from a cookie value
    pub fn unwrap(&self, value: &str) -> Result<String, SessionError> {
        let bytes = URL_SAFE
            .decode(value)
            .map_err(|_| SessionError::MalformedCookie)?;
        String::from_utf8(bytes).map_err(|_| SessionError::MalformedCookie)
    }

    /// Same name, empty value, expired at the epoch
    pub fn expired(&self) -> Cookie<'static> {
        self.build(String::new(), OffsetDateTime::UNIX_EPOCH)
    }

    fn build(&self, value: String, expires: OffsetDateTime) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .expires(expires)
            .build()
    }
}
