//! Bearer token middleware for the protected routes.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::ApiError;

const BEARER_SCHEME: &str = "Bearer";

/// Access token taken from the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

/// Reject requests without a bearer token; otherwise expose the token to the
/// handlers as an `AccessToken` extension.
pub async fn require_bearer(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default())
        .unwrap_or_default();

    if value.is_empty() {
        let msg = "authorization header is empty, set valid authorization token";
        warn!("{}", msg);
        return Err(ApiError::Unauthorized(msg.to_string()));
    }

    let Some(token) = bearer_token(value) else {
        let msg = "authorization token is in invalid format";
        warn!("{}", msg);
        return Err(ApiError::Unauthorized(msg.to_string()));
    };

    let token = AccessToken(token.to_string());
    req.extensions_mut().insert(token);
    Ok(next.run(req).await)
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix(BEARER_SCHEME)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
