//! Signin workflow: authorization URL, code exchange, refresh and revoke.

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use typing_core::Token;
use url::Url;

use super::AppState;
use crate::error::{ApiError, Result};

const INVALID_REDIRECT: &str = "redirect url is invalid or is not a localhost url";

#[derive(Debug, Deserialize)]
pub struct UrlParams {
    pub redirect: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlValue {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeForm {
    #[serde(default)]
    pub auth_code: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshForm {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevokeForm {
    #[serde(default)]
    pub token: String,
}

/// GET /api/v1/signin/auth/url
pub async fn get_url(
    State(state): State<AppState>,
    params: std::result::Result<Query<UrlParams>, QueryRejection>,
) -> Result<Json<UrlValue>> {
    let Ok(Query(params)) = params else {
        return Err(bad_request("query parameters are invalid"));
    };
    let redirect = non_empty(params.redirect.as_deref());
    if let Some(redirect) = redirect {
        check_localhost(redirect)?;
    }

    let auth = state.container.auth()?;
    let url = auth
        .get_url(redirect, non_empty(params.state.as_deref()))
        .map_err(|e| ApiError::with_context(e, "authorization url creation error"))?;
    Ok(Json(UrlValue { url }))
}

/// POST /api/v1/signin/auth/token
pub async fn exchange(
    State(state): State<AppState>,
    form: std::result::Result<Form<ExchangeForm>, FormRejection>,
) -> Result<Json<Token>> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    if form.auth_code.is_empty() {
        return Err(bad_request("authorization code is empty"));
    }
    let redirect = non_empty(form.redirect.as_deref());
    if let Some(redirect) = redirect {
        check_localhost(redirect)?;
    }

    let auth = state.container.auth()?;
    let token = auth
        .exchange(&form.auth_code, redirect)
        .await
        .map_err(|e| ApiError::with_context(e, "token exchange failed, check the authorization code"))?;
    Ok(Json(token))
}

/// POST /api/v1/signin/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    form: std::result::Result<Form<RefreshForm>, FormRejection>,
) -> Result<Json<Token>> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    if form.refresh_token.is_empty() {
        return Err(bad_request("refresh token is empty"));
    }

    let auth = state.container.auth()?;
    let token = auth
        .refresh(&form.refresh_token)
        .await
        .map_err(|e| ApiError::with_context(e, "access token refresh failed, check the token"))?;
    Ok(Json(token))
}

/// POST /api/v1/signin/auth/revoke
pub async fn revoke(
    State(state): State<AppState>,
    form: std::result::Result<Form<RevokeForm>, FormRejection>,
) -> Result<StatusCode> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    if form.token.is_empty() {
        return Err(bad_request("token value is empty"));
    }

    let auth = state.container.auth()?;
    auth.revoke(&form.token)
        .await
        .map_err(|e| ApiError::with_context(e, "token revocation failed, check the token value"))?;
    Ok(StatusCode::NO_CONTENT)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn bad_request(msg: &str) -> ApiError {
    warn!("{}", msg);
    ApiError::BadRequest(msg.to_string())
}

/// Redirects may only point back at the local machine.
fn check_localhost(redirect: &str) -> Result<()> {
    let is_local = Url::parse(redirect)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .is_some_and(|host| host.contains("localhost"));

    if !is_local {
        warn!("{}: '{}'", INVALID_REDIRECT, redirect);
        return Err(ApiError::BadRequest(INVALID_REDIRECT.to_string()));
    }
    Ok(())
}
