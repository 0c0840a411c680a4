//! Google OAuth2 authorization workflow.
//!
//! Builds the consent URL and talks to Google's token endpoint to exchange,
//! refresh and revoke tokens. Nothing is cached: every call goes upstream.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use typing_core::{Auth, Error, Result, Token};
use url::Url;

use crate::client::transport;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Access requested from the user: the app-data folder plus basic profile.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.appdata",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// OAuth client credential as downloaded from the Google API console.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientCred {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct CredFile {
    installed: Option<ClientCred>,
    web: Option<ClientCred>,
}

impl ClientCred {
    /// Parse the credential JSON; either the `installed` or the `web`
    /// section is accepted.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let file: CredFile = serde_json::from_slice(json)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| Error::Decode("client cred has neither 'installed' nor 'web' section".to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read(path).map_err(|e| {
            Error::Internal(format!("failed to read client cred '{}': {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

impl TokenResponse {
    fn into_token(self, fallback_refresh: &str) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| fallback_refresh.to_string()),
            expiry: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

/// Google implementation of the authorization workflow.
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    cred: ClientCred,
    http: Client,
}

impl GoogleAuth {
    pub fn new(cred: ClientCred) -> Self {
        Self {
            cred,
            http: Client::new(),
        }
    }

    pub fn cred(&self) -> &ClientCred {
        &self.cred
    }

    fn redirect_uri<'a>(&'a self, redirect: Option<&'a str>) -> &'a str {
        redirect
            .filter(|r| !r.is_empty())
            .or_else(|| self.cred.redirect_uris.first().map(String::as_str))
            .unwrap_or_default()
    }

    /// Revocation lives next to the token endpoint, at `/revoke`.
    fn revoke_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.cred.token_uri)
            .map_err(|e| Error::Internal(format!("invalid token uri: {}", e)))?;
        url.set_path("/revoke");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let resp = self
            .http
            .post(&self.cred.token_uri)
            .form(form)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Token endpoint returned {}: {}", status, body);
            return Err(token_error(status, body));
        }

        resp.json()
            .await
            .map_err(|e| Error::Decode(format!("invalid token response: {}", e)))
    }
}

/// An invalid code or token is reported by Google as 400 `invalid_grant`.
fn token_error(status: StatusCode, body: String) -> Error {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::Unauthorized,
        _ => Error::from_status(status.as_u16(), body),
    }
}

#[async_trait]
impl Auth for GoogleAuth {
    fn get_url(&self, redirect: Option<&str>, state: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&self.cred.auth_uri)
            .map_err(|e| Error::Internal(format!("invalid auth uri: {}", e)))?;
        let state = state.filter(|s| !s.is_empty()).unwrap_or("0");

        url.query_pairs_mut()
            .append_pair("client_id", &self.cred.client_id)
            .append_pair("redirect_uri", self.redirect_uri(redirect))
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline");

        Ok(url.into())
    }

    #[instrument(skip(self, code), level = "debug")]
    async fn exchange(&self, code: &str, redirect: Option<&str>) -> Result<Token> {
        let resp = self
            .request_token(&[
                ("client_id", self.cred.client_id.as_str()),
                ("client_secret", self.cred.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri(redirect)),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        info!("Exchanged authorization code for a token");
        Ok(resp.into_token(""))
    }

    #[instrument(skip(self, refresh_token), level = "debug")]
    async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        let resp = self
            .request_token(&[
                ("client_id", self.cred.client_id.as_str()),
                ("client_secret", self.cred.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        debug!("Refreshed access token, expires in {}s", resp.expires_in);
        Ok(resp.into_token(refresh_token))
    }

    #[instrument(skip(self, token), level = "debug")]
    async fn revoke(&self, token: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.revoke_url()?)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            warn!("Token revocation failed with {}: {}", status, body);
            return Err(token_error(status, body));
        }

        info!("Token revoked");
        Ok(())
    }
}
