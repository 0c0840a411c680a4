//! Profile of the token holder from Google's userinfo endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;
use typing_core::{Result, User, Userinfo};

use crate::client::{status_error, transport, GOOGLE_APIS_URL};

pub struct GoogleUserinfo {
    http: Client,
    base_url: String,
}

impl GoogleUserinfo {
    /// `http` must be bound to the user's token.
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, GOOGLE_APIS_URL)
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Userinfo for GoogleUserinfo {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self) -> Result<User> {
        let resp = self
            .http
            .get(format!("{}/oauth2/v2/userinfo", self.base_url))
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| typing_core::Error::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typing_core::Error;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "42",
                "name": "Test User",
                "email": "user@example.com",
                "picture": "https://example.com/p.png",
                "verified_email": true
            })))
            .mount(&server)
            .await;

        let user = GoogleUserinfo::with_base_url(Client::new(), &server.uri())
            .get()
            .await
            .unwrap();

        assert_eq!(user.id, "42");
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.picture, "https://example.com/p.png");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = GoogleUserinfo::with_base_url(Client::new(), &server.uri())
            .get()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }
}
