//! OAuth signin abstractions: the authorization workflow and the profile of
//! the token holder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Credentials returned by the authorization workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
}

/// Basic profile of the user owning an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

/// Authorization workflow against an OAuth provider.
#[async_trait]
pub trait Auth: Send + Sync {
    /// Build the URL the user visits to grant access.
    ///
    /// `redirect` overrides the provider's default redirect URI; `state`
    /// defaults to `"0"`.
    fn get_url(&self, redirect: Option<&str>, state: Option<&str>) -> Result<String>;

    /// Convert an authorization code into a token.
    async fn exchange(&self, code: &str, redirect: Option<&str>) -> Result<Token>;

    /// Renew the access token using a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<Token>;

    /// Revoke a token, resetting the authorization workflow.
    async fn revoke(&self, token: &str) -> Result<()>;
}

#[async_trait]
pub trait Userinfo: Send + Sync {
    /// Fetch the user associated with the bound token.
    async fn get(&self) -> Result<User>;
}
