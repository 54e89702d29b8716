//! Google profile and token models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Basic profile returned by the OIDC userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable subject identifier
    #[serde(default)]
    pub sub: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Email address (requires the `email` scope)
    #[serde(default)]
    pub email: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub picture: Option<String>,
}

/// Tokens returned by a successful authorization-code exchange.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Vec<String>,
}

/// Raw token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn into_token_set(self, received_at: DateTime<Utc>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            id_token: self.id_token,
            expires_at: self
                .expires_in
                .and_then(Duration::try_seconds)
                .map(|lifetime| received_at + lifetime),
            scope: self
                .scope
                .unwrap_or_default()
                .split_whitespace()
                .map(ToOwned::to_owned)
                .collect(),
        }
    }
}
