//! Section CRUD under `/api/v1/storage/notes/{id}/sections`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use tracing::warn;
use typing_core::{Section, Sectionstore, WritableSection};

use super::{created, scoped_client, AppState};
use crate::error::{ApiError, Result};
use crate::middleware::AccessToken;

fn sectionstore(state: &AppState, token: &AccessToken) -> Result<Arc<dyn Sectionstore>> {
    let client = scoped_client(token)?;
    Ok(state.container.sectionstore(&client)?)
}

fn writable_section(
    body: std::result::Result<Json<WritableSection>, JsonRejection>,
) -> Result<WritableSection> {
    let Json(section) = body.map_err(|e| {
        warn!("Invalid section body: {}", e);
        ApiError::BadRequest("request body is not a valid section".to_string())
    })?;
    section.validate().map_err(|e| {
        warn!("{}", e);
        ApiError::from(e)
    })?;
    Ok(section)
}

/// POST /api/v1/storage/notes/{id}/sections
pub async fn create_section(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path(note_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    body: std::result::Result<Json<WritableSection>, JsonRejection>,
) -> Result<Response> {
    let input = writable_section(body)?;
    let store = sectionstore(&state, &token)?;

    let section = store
        .create(&note_id, &input)
        .await
        .map_err(|e| ApiError::with_context(e, "section creation error"))?;
    Ok(created(&uri, &section.id, &section))
}

/// GET /api/v1/storage/notes/{id}/sections
pub async fn get_sections(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path(note_id): Path<String>,
) -> Result<Json<Vec<Section>>> {
    let store = sectionstore(&state, &token)?;
    let sections = store
        .get_all(&note_id)
        .await
        .map_err(|e| ApiError::with_context(e, "section retrieval error"))?;
    Ok(Json(sections))
}

/// GET /api/v1/storage/notes/{id}/sections/{section_id}
pub async fn get_section(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path((note_id, section_id)): Path<(String, String)>,
) -> Result<Json<Section>> {
    let store = sectionstore(&state, &token)?;
    let section = store
        .get(&note_id, &section_id)
        .await
        .map_err(|e| ApiError::with_context(e, "section retrieval error"))?;
    Ok(Json(section))
}

/// PUT /api/v1/storage/notes/{id}/sections/{section_id}
pub async fn update_section(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path((note_id, section_id)): Path<(String, String)>,
    body: std::result::Result<Json<WritableSection>, JsonRejection>,
) -> Result<Json<Section>> {
    let input = writable_section(body)?;
    let store = sectionstore(&state, &token)?;

    let section = store
        .update(&note_id, &section_id, &input)
        .await
        .map_err(|e| ApiError::with_context(e, "section update error"))?;
    Ok(Json(section))
}

/// DELETE /api/v1/storage/notes/{id}/sections/{section_id}
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Path((note_id, section_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let store = sectionstore(&state, &token)?;
    store
        .delete(&note_id, &section_id)
        .await
        .map_err(|e| ApiError::with_context(e, "section deletion error"))?;
    Ok(StatusCode::NO_CONTENT)
}
