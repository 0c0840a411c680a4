//! Token-scoped HTTP client construction and response classification.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use typing_core::Error;

/// Base URL of the Google APIs (Drive v3 and OAuth2 userinfo).
pub const GOOGLE_APIS_URL: &str = "https://www.googleapis.com";

/// Create an HTTP client that sends `Authorization: Bearer <token>` on every
/// request. Adapters built from it are bound to the caller's token.
pub fn client_with_token(access_token: &str) -> typing_core::Result<Client> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|_| Error::Unauthorized)?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Internal(format!("HTTP client creation failed: {}", e)))
}

pub(crate) fn transport(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

/// Turn a non-success response into a domain error.
pub(crate) async fn status_error(resp: Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Error::from_status(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token("abc123").unwrap();
        let resp = client
            .get(format!("{}/ping", server.uri()))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    #[test]
    fn test_invalid_token_characters_are_rejected() {
        assert!(matches!(
            client_with_token("bad\ntoken"),
            Err(Error::Unauthorized)
        ));
    }
}
