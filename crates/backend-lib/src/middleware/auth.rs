//! Session gate for protected routes.
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use metrics::counter;

use crate::auth::{Identity, SessionError};
use crate::metrics::SESSION_REJECTED;
use crate::storage::Storage;
use crate::{error::AppError, AppState};

/// The identity behind the current request.
///
/// Inserted into the request extensions by [`require_session`]; handlers
/// take it as an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable without the gate if a route was wired wrong
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized(SessionError::MissingCookie))
    }
}

/// Reject the request with 401 unless it carries a valid session cookie
pub async fn require_session<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = jar
        .get(state.sessions.cookie_name())
        .ok_or(SessionError::MissingCookie)
        .and_then(|cookie| state.sessions.validate_session(cookie.value()))
        .map_err(|kind| {
            counter!(SESSION_REJECTED, "reason" => kind.reason()).increment(1);
            tracing::debug!(reason = kind.reason(), path = %request.uri().path(), "session rejected");
            AppError::Unauthorized(kind)
        })?;

    request.extensions_mut().insert(CurrentUser(identity));
    Ok(next.run(request).await)
}
