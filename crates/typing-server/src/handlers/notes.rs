//! Note CRUD under `/api/v1/storage/notes`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use tracing::warn;
use typing_core::{Note, Notestore, WritableNote};

use super::{created, scoped_client, AppState};
use crate::error::{ApiError, Result};
use crate::middleware::AccessToken;

fn notestore(state: &AppState, token: &AccessToken) -> Result<Arc<dyn Notestore>> {
    let client = scoped_client(token)?;
    Ok(state.container.notestore(&client)?)
}

/// Parse and validate a note body.
fn writable_note(
    body: std::result::Result<Json<WritableNote>, JsonRejection>,
) -> Result<WritableNote> {
    let Json(note) = body.map_err(|e| {
        warn!("Invalid note body: {}", e);
        ApiError::BadRequest("request body is not a valid note".to_string())
    })?;
    note.validate().map_err(|e| {
        warn!("{}", e);
        ApiError::from(e)
    })?;
    Ok(note)
}

fn note_not_found(id: &str) -> ApiError {
    let msg = format!("note with id '{}' not found", id);
    warn!("{}", msg);
    ApiError::NotFound(msg)
}

/// POST /api/v1/storage/notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    OriginalUri(uri): OriginalUri,
    body: std::result::Result<Json<WritableNote>, JsonRejection>,
) -> Result<Response> {
    let input = writable_note(body)?;
    let store = notestore(&state, &token)?;

    let note = store
        .create(&input)
        .await
        .map_err(|e| ApiError::with_context(e, "note creation error"))?;
    Ok(created(&uri, &note.id, &note))
}

/// GET /api/v1/storage/notes
pub async fn get_notes(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<Vec<Note>>> {
    let store = notestore(&state, &token)?;
    let notes = store
        .get_all()
        .await
        .map_err(|e| ApiError::with_context(e, "note retrieval error"))?;
    Ok(Json(notes))
}

/// GET /api/v1/storage/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<String>,
) -> Result<Json<Note>> {
    let store = notestore(&state, &token)?;
    store
        .get(&id)
        .await
        .map_err(|e| ApiError::with_context(e, "note retrieval error"))?
        .map(Json)
        .ok_or_else(|| note_not_found(&id))
}

/// PUT /api/v1/storage/notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<String>,
    body: std::result::Result<Json<WritableNote>, JsonRejection>,
) -> Result<Json<Note>> {
    let input = writable_note(body)?;
    let store = notestore(&state, &token)?;

    store
        .update(&id, &input)
        .await
        .map_err(|e| ApiError::with_context(e, "note update error"))?
        .map(Json)
        .ok_or_else(|| note_not_found(&id))
}

/// DELETE /api/v1/storage/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let store = notestore(&state, &token)?;
    let deleted = store
        .delete(&id)
        .await
        .map_err(|e| ApiError::with_context(e, "note deletion error"))?;

    if !deleted {
        return Err(note_not_found(&id));
    }
    Ok(StatusCode::NO_CONTENT)
}
