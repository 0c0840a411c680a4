use axum::Json;
use serde::Serialize;

use crate::version::version_string;

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// GET /api/version
pub async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: version_string(),
    })
}
