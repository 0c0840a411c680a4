use axum::extract::State;
use axum::{Extension, Json};
use typing_core::User;

use super::{scoped_client, AppState};
use crate::error::{ApiError, Result};
use crate::middleware::AccessToken;

/// GET /api/v1/signin/userinfo
pub async fn get_userinfo(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<User>> {
    let client = scoped_client(&token)?;
    let userinfo = state.container.userinfo(&client)?;

    let user = userinfo
        .get()
        .await
        .map_err(|e| ApiError::with_context(e, "user info retrieval error"))?;
    Ok(Json(user))
}
