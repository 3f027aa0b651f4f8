//! Note endpoints. Every query is scoped to the caller's identity.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use metrics::counter;
use notes_common::{Note, NoteDraft, NOTES_PAGE_SIZE};
use serde::Deserialize;
use uuid::Uuid;

use super::json_body;
use crate::error::AppError;
use crate::metrics::NOTE_CREATED;
use crate::middleware::CurrentUser;
use crate::storage::Storage;
use crate::validation::validate_note;
use crate::AppState;

/// `?p=N`, 1-based. Kept as a string so garbage falls back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub p: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> usize {
        self.p
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }

    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(NOTES_PAGE_SIZE)
    }
}

/// `POST /notes/add`
pub async fn add_note<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(identity): CurrentUser,
    body: Result<Json<NoteDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let draft = json_body(body)?;
    validate_note(&draft)?;

    let note = Note {
        id: Uuid::new_v4(),
        user_id: identity.id,
        username: identity.username.to_string(),
        title: draft.title,
        text: draft.text,
        created_at: Utc::now(),
    };
    state.storage.add_note(&note).await?;

    counter!(NOTE_CREATED).increment(1);
    tracing::debug!(user_id = %identity.id, note_id = %note.id, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /notes/get?p=N`
pub async fn get_notes<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state
        .storage
        .list_notes(identity.id, query.offset(), NOTES_PAGE_SIZE)
        .await?;
    Ok(Json(notes))
}
