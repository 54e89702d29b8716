// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interactive authorization prompt.
//!
//! The prompt shows the consent page to the user and waits for the provider
//! to redirect back. The native implementation opens the system browser and
//! receives the redirect on a loopback listener (RFC 8252).

use crate::routes::callback::{CallbackParams, CallbackState, CALLBACK_PATH};
use crate::routes::create_callback_router;
use crate::services::pkce::AuthRequest;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use url::Url;

/// Terminal result of an authorization prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// The provider redirected back without an error.
    Success {
        params: CallbackParams,
        redirect_uri: Url,
    },
    /// The user declined consent.
    Cancel,
    /// The user walked away from the prompt.
    Dismiss,
    /// The prompt itself failed or the redirect was invalid.
    Error { message: String },
}

impl PromptResult {
    /// Authorization code, if this is a success carrying a non-empty one.
    pub fn code(&self) -> Option<&str> {
        match self {
            PromptResult::Success { params, .. } => {
                params.get("code").map(String::as_str).filter(|c| !c.is_empty())
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PromptResult::Success { .. } => "success",
            PromptResult::Cancel => "cancel",
            PromptResult::Dismiss => "dismiss",
            PromptResult::Error { .. } => "error",
        }
    }
}

/// Shows an authorization request to the user and awaits the redirect.
#[async_trait]
pub trait AuthorizationPrompt: Send + Sync {
    async fn prompt(&self, request: &AuthRequest, authorization_endpoint: &Url) -> PromptResult;
}

type UrlNotifier = Arc<dyn Fn(&Url) + Send + Sync>;

/// Lets the UI abandon a pending loopback sign-in.
///
/// Each call bumps a counter; only a prompt that is already waiting sees it.
#[derive(Clone)]
pub struct DismissHandle(Arc<watch::Sender<u64>>);

impl DismissHandle {
    pub fn dismiss(&self) {
        self.0.send_modify(|n| *n = n.wrapping_add(1));
    }
}

/// Browser + loopback listener prompt.
#[derive(Clone)]
pub struct LoopbackPrompt {
    port: u16,
    open_browser: bool,
    notify: Option<UrlNotifier>,
    dismiss: Arc<watch::Sender<u64>>,
}

impl LoopbackPrompt {
    /// `port` 0 picks a free port.
    pub fn new(port: u16, open_browser: bool) -> Self {
        let (dismiss, _) = watch::channel(0);
        Self {
            port,
            open_browser,
            notify: None,
            dismiss: Arc::new(dismiss),
        }
    }

    /// Called with the consent URL before waiting, e.g. to show it.
    pub fn on_authorization_url<F>(mut self, notify: F) -> Self
    where
        F: Fn(&Url) + Send + Sync + 'static,
    {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn dismiss_handle(&self) -> DismissHandle {
        DismissHandle(self.dismiss.clone())
    }

    async fn run(&self, request: &AuthRequest, endpoint: &Url) -> anyhow::Result<PromptResult> {
        // Dismissals sent before this point belong to an earlier prompt
        let mut dismissed = self.dismiss.subscribe();
        dismissed.borrow_and_update();

        let listener = TcpListener::bind(("127.0.0.1", self.port))
            .await
            .context("failed binding loopback listener")?;
        let port = listener.local_addr()?.port();
        let redirect_uri = Url::parse(&format!("http://127.0.0.1:{}{}", port, CALLBACK_PATH))?;
        let auth_url = request.authorization_url(endpoint, &redirect_uri);

        let (params_tx, params_rx) = oneshot::channel();
        let app = create_callback_router(Arc::new(CallbackState::new(params_tx)));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::warn!(error = %e, "Loopback callback server failed");
            }
        });

        tracing::info!(port, "Waiting for OAuth redirect on loopback listener");

        if let Some(notify) = &self.notify {
            notify(&auth_url);
        }

        if self.open_browser {
            if let Err(e) = open::that(auth_url.as_str()) {
                tracing::warn!(error = %e, "Failed to launch system browser");
            }
        }

        let params = tokio::select! {
            received = params_rx => received.ok(),
            _ = dismissed.changed() => {
                tracing::info!("Sign-in dismissed");
                let _ = shutdown_tx.send(());
                return Ok(PromptResult::Dismiss);
            }
        };

        // The server finishes writing the response page, then stops.
        let _ = shutdown_tx.send(());

        Ok(classify_redirect(params, request, redirect_uri))
    }
}

#[async_trait]
impl AuthorizationPrompt for LoopbackPrompt {
    async fn prompt(&self, request: &AuthRequest, authorization_endpoint: &Url) -> PromptResult {
        match self.run(request, authorization_endpoint).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Authorization prompt failed");
                PromptResult::Error {
                    message: format!("{:#}", e),
                }
            }
        }
    }
}

/// Turn the redirect query into a prompt result.
pub fn classify_redirect(
    params: Option<CallbackParams>,
    request: &AuthRequest,
    redirect_uri: Url,
) -> PromptResult {
    let Some(params) = params else {
        return PromptResult::Error {
            message: "authorization listener closed before receiving the redirect".to_string(),
        };
    };

    if let Some(error) = params.get("error") {
        if error == "access_denied" {
            return PromptResult::Cancel;
        }
        let message = match params.get("error_description") {
            Some(desc) => format!("{}: {}", error, desc),
            None => error.clone(),
        };
        return PromptResult::Error { message };
    }

    let state_ok = params
        .get("state")
        .is_some_and(|returned| request.state_matches(returned));
    if !state_ok {
        tracing::error!("OAuth state mismatch! Potential tampering.");
        return PromptResult::Error {
            message: "authorization state mismatch".to_string(),
        };
    }

    PromptResult::Success {
        params,
        redirect_uri,
    }
}
