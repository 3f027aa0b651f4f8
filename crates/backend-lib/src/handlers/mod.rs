// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.
use axum::{
    extract::rejection::JsonRejection,
    http::Uri,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::AppError;

pub mod notes;
pub mod users;

/// Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Any route not in the table
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Turn axum's JSON rejection into our error body
fn json_body<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
