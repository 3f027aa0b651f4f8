//! Account endpoints.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    Json,
};
use axum_extra::extract::cookie::Cookie;
use notes_common::{Credentials, UserInfo};

use super::json_body;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::storage::Storage;
use crate::AppState;

/// `POST /signup`
pub async fn signup<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), AppError> {
    let credentials = json_body(body)?;
    let identity = state.auth.sign_up(credentials).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&identity))))
}

/// `Set-Cookie` written verbatim. `CookieJar` would percent-encode the
/// base64 padding.
fn set_cookie(cookie: &Cookie<'_>) -> [(HeaderName, String); 1] {
    [(SET_COOKIE, cookie.to_string())]
}

/// `POST /login`, sets the session cookie
pub async fn login<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<([(HeaderName, String); 1], Json<UserInfo>), AppError> {
    let credentials = json_body(body)?;
    let (identity, cookie) = state.auth.log_in(credentials).await?;
    Ok((set_cookie(&cookie), Json(UserInfo::from(&identity))))
}

/// `GET /logout`, overwrites the session cookie with an expired one
pub async fn logout<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> ([(HeaderName, String); 1], StatusCode) {
    (set_cookie(&state.auth.log_out()), StatusCode::NO_CONTENT)
}

/// `GET /me`
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo::from(&identity))
}
