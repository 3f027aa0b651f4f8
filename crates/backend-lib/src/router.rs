// ============================
// crates/backend-lib/src/router.rs
// ============================
//! Route table and layer composition.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, not_found, notes, users};
use crate::middleware::{rate_limit, require_session};
use crate::storage::Storage;
use crate::AppState;

/// Create the HTTP router.
///
/// `/me` and `/notes/*` sit behind the session gate; every route, public or
/// not, passes the global rate limiter first.
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    let protected = Router::new()
        .route("/me", get(users::me))
        .route("/notes/add", post(notes::add_note::<S>))
        .route("/notes/get", get(notes::get_notes::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_session::<S>));

    Router::new()
        .route("/health", get(health))
        .route("/signup", post(users::signup::<S>))
        .route("/login", post(users::login::<S>))
        .route("/logout", get(users::logout::<S>))
        .merge(protected)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
