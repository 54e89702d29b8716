// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client for the authorization-code exchange.
//!
//! Handles:
//! - Code + PKCE verifier exchange at the token endpoint
//! - Profile fetch from the OIDC userinfo endpoint
//! - Refresh token revocation

use crate::error::AppError;
use crate::models::{Profile, TokenResponse, TokenSet};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Google OAuth / OIDC endpoint set.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorization: Url,
    pub token: Url,
    pub revocation: Url,
    pub userinfo: Url,
}

impl GoogleEndpoints {
    /// Endpoints rooted at a single base URL (used against mock servers).
    pub fn with_base(base: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base)?;
        Ok(Self {
            authorization: base.join("/o/oauth2/v2/auth")?,
            token: base.join("/token")?,
            revocation: base.join("/revoke")?,
            userinfo: base.join("/oauth2/v3/userinfo")?,
        })
    }
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        // Constant URLs, parse cannot fail.
        Self {
            authorization: Url::parse("https://accounts.google.com/o/oauth2/v2/auth").unwrap(),
            token: Url::parse("https://oauth2.googleapis.com/token").unwrap(),
            revocation: Url::parse("https://oauth2.googleapis.com/revoke").unwrap(),
            userinfo: Url::parse("https://www.googleapis.com/oauth2/v3/userinfo").unwrap(),
        }
    }
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    endpoints: GoogleEndpoints,
}

impl GoogleClient {
    /// Create a client for the public Google endpoints.
    pub fn new(client_id: String) -> Self {
        Self::with_endpoints(client_id, GoogleEndpoints::default())
    }

    /// Create a client with explicit endpoints.
    pub fn with_endpoints(client_id: String, endpoints: GoogleEndpoints) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            client_id,
            endpoints,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn endpoints(&self) -> &GoogleEndpoints {
        &self.endpoints
    }

    /// Exchange an authorization code (plus PKCE verifier) for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &Url,
    ) -> Result<TokenSet, AppError> {
        let response = self
            .http
            .post(self.endpoints.token.clone())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("code", code),
                ("code_verifier", code_verifier),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchangeFailed(format!("Token exchange failed: {}", e)))?;

        let received_at = chrono::Utc::now();
        let payload: TokenResponse = check_response_json(response, "token exchange").await?;

        tracing::debug!(
            has_refresh_token = payload.refresh_token.is_some(),
            expires_in = ?payload.expires_in,
            "Token exchange succeeded"
        );

        Ok(payload.into_token_set(received_at))
    }

    /// Fetch the signed-in user's profile.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<Profile, AppError> {
        let response = self
            .http
            .get(self.endpoints.userinfo.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::AuthExchangeFailed(format!("Userinfo request failed: {}", e)))?;

        check_response_json(response, "userinfo").await
    }

    /// Revoke a token at the provider.
    ///
    /// POST https://oauth2.googleapis.com/revoke
    /// Content-Type: application/x-www-form-urlencoded
    /// token={token}
    ///
    /// Returns the HTTP status; only transport failures are errors.
    pub async fn revoke_token(&self, token: &str) -> Result<reqwest::StatusCode, AppError> {
        let response = self
            .http
            .post(self.endpoints.revocation.clone())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(format!("token={}", urlencoding::encode(token)))
            .send()
            .await
            .map_err(|e| AppError::RevokeFailed(format!("Revocation request failed: {}", e)))?;

        Ok(response.status())
    }
}

/// Google's JSON error body (`{"error": "...", "error_description": "..."}`).
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Google {} failed", what);

        let detail = match serde_json::from_str::<OAuthErrorBody>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(AppError::AuthExchangeFailed(format!(
            "{} returned HTTP {}: {}",
            what, status, detail
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::AuthExchangeFailed(format!("JSON parse error in {}: {}", what, e)))
}
