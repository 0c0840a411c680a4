//! HTTP handlers.
//!
//! Every request resolves its adapters from the container; protected routes
//! first bind them to the caller's access token.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Client as HttpClient;
use serde::Serialize;
use typing_core::Container;
use typing_gdrive::client_with_token;

use crate::error::{ApiError, Result};
use crate::middleware::AccessToken;

pub mod auth;
pub mod notes;
pub mod sections;
pub mod userinfo;
pub mod version;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub container: Arc<Container<HttpClient>>,
}

impl AppState {
    pub fn new(container: Container<HttpClient>) -> Self {
        Self {
            container: Arc::new(container),
        }
    }
}

/// HTTP client carrying the caller's token.
fn scoped_client(token: &AccessToken) -> Result<HttpClient> {
    client_with_token(&token.0).map_err(|e| ApiError::with_context(e, "http client creation error"))
}

/// 201 response pointing at the created resource.
fn created<T: Serialize>(uri: &Uri, id: &str, body: T) -> Response {
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);
    let mut response = (axum::http::StatusCode::CREATED, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}
