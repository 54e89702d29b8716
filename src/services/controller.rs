// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth flow controller: connect and revoke third-party accounts.
//!
//! Google goes through the authorization-code flow with PKCE:
//! 1. Prompt the user with a PKCE authorization request
//! 2. Exchange the returned code for tokens
//! 3. Persist the refresh token (if any) in secure storage
//! 4. Fetch the profile with the access token
//!
//! Facebook and Amazon are simulated: a fixed wait, no network, no token.
//!
//! Every failure is terminal for the action. Partial state is not rolled back:
//! a refresh token written in step 3 survives a failure in step 4.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Profile, Provider};
use crate::services::google::GoogleClient;
use crate::services::pkce::{AuthRequest, GOOGLE_SCOPES};
use crate::services::prompt::{AuthorizationPrompt, PromptResult};
use crate::services::secure_store::{SecretStore, GOOGLE_REFRESH_TOKEN_KEY};
use std::time::Duration;

/// How a provider gets connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Real authorization-code + PKCE flow.
    OAuth,
    /// No network; completes after `delay`.
    Simulated { delay: Duration },
}

/// Result of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub provider: Provider,
    /// Only set for providers with a real sign-in.
    pub profile: Option<Profile>,
}

/// Result of a successful revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeOutcome {
    pub provider: Provider,
    /// Whether a stored token was sent for revocation and deleted.
    pub token_deleted: bool,
}

/// Orchestrates connect/revoke round trips.
pub struct AuthFlowController<S, P> {
    google: GoogleClient,
    store: S,
    prompt: P,
    mock_delay: Duration,
}

impl<S: SecretStore, P: AuthorizationPrompt> AuthFlowController<S, P> {
    pub fn new(google: GoogleClient, store: S, prompt: P, mock_delay: Duration) -> Self {
        Self {
            google,
            store,
            prompt,
            mock_delay,
        }
    }

    /// Controller against the public Google endpoints.
    pub fn from_config(config: &Config, store: S, prompt: P) -> Self {
        Self::new(
            GoogleClient::new(config.google_client_id.clone()),
            store,
            prompt,
            config.mock_connect_delay,
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mode(&self, provider: Provider) -> ConnectMode {
        match provider {
            Provider::Google => ConnectMode::OAuth,
            Provider::Facebook | Provider::Amazon => ConnectMode::Simulated {
                delay: self.mock_delay,
            },
        }
    }

    /// Connect an account.
    pub async fn connect(&self, provider: Provider) -> Result<ConnectOutcome> {
        match self.mode(provider) {
            ConnectMode::OAuth => self.connect_oauth(provider).await,
            ConnectMode::Simulated { delay } => {
                tracing::info!(provider = %provider, delay = ?delay, "Simulating connection");
                tokio::time::sleep(delay).await;
                Ok(simulated_outcome(provider))
            }
        }
    }

    /// Complete a simulated connection without waiting.
    ///
    /// Returns `None` for providers that need an interactive sign-in.
    pub fn connect_immediately(&self, provider: Provider) -> Option<ConnectOutcome> {
        match self.mode(provider) {
            ConnectMode::OAuth => None,
            ConnectMode::Simulated { .. } => Some(simulated_outcome(provider)),
        }
    }

    async fn connect_oauth(&self, provider: Provider) -> Result<ConnectOutcome> {
        let request = AuthRequest::new(self.google.client_id(), &GOOGLE_SCOPES);

        tracing::info!(provider = %provider, "Starting OAuth sign-in");
        let result = self
            .prompt
            .prompt(&request, &self.google.endpoints().authorization)
            .await;

        let (code, redirect_uri) = match (&result, result.code()) {
            (PromptResult::Success { redirect_uri, .. }, Some(code)) => {
                (code.to_string(), redirect_uri.clone())
            }
            _ => {
                tracing::info!(result = result.kind(), "Login was cancelled or failed");
                return Err(AppError::LoginCancelledOrFailed);
            }
        };

        tracing::info!("Exchanging authorization code for tokens");
        let tokens = self
            .google
            .exchange_code(&code, request.code_verifier(), &redirect_uri)
            .await?;

        if let Some(refresh_token) = &tokens.refresh_token {
            self.store
                .set(GOOGLE_REFRESH_TOKEN_KEY, refresh_token)
                .await
                .map_err(AppError::into_exchange_failure)?;
            tracing::info!("Refresh token stored");
        } else {
            tracing::debug!("No refresh token returned; keeping any stored token");
        }

        let profile = self.google.fetch_userinfo(&tokens.access_token).await?;

        tracing::info!(
            provider = %provider,
            email = profile.email.as_deref().unwrap_or("<missing>"),
            "OAuth sign-in complete"
        );

        Ok(ConnectOutcome {
            provider,
            profile: Some(profile),
        })
    }

    /// Revoke an account connection.
    pub async fn revoke(&self, provider: Provider) -> Result<RevokeOutcome> {
        match self.mode(provider) {
            ConnectMode::OAuth => self.revoke_oauth(provider).await,
            ConnectMode::Simulated { .. } => {
                tracing::info!(provider = %provider, "Disconnecting simulated account");
                Ok(RevokeOutcome {
                    provider,
                    token_deleted: false,
                })
            }
        }
    }

    async fn revoke_oauth(&self, provider: Provider) -> Result<RevokeOutcome> {
        let stored = self
            .store
            .get(GOOGLE_REFRESH_TOKEN_KEY)
            .await
            .map_err(AppError::into_revoke_failure)?;

        let Some(refresh_token) = stored else {
            tracing::info!(provider = %provider, "No stored token; clearing local state only");
            return Ok(RevokeOutcome {
                provider,
                token_deleted: false,
            });
        };

        let status = self.google.revoke_token(&refresh_token).await?;
        if status.is_success() {
            tracing::info!(provider = %provider, "Token revoked at provider");
        } else {
            tracing::warn!(
                provider = %provider,
                status = %status,
                "Revocation endpoint rejected the token; deleting it locally anyway"
            );
        }

        self.store
            .delete(GOOGLE_REFRESH_TOKEN_KEY)
            .await
            .map_err(AppError::into_revoke_failure)?;

        Ok(RevokeOutcome {
            provider,
            token_deleted: true,
        })
    }
}

fn simulated_outcome(provider: Provider) -> ConnectOutcome {
    ConnectOutcome {
        provider,
        profile: None,
    }
}
