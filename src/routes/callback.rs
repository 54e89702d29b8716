// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth redirect callback served on the loopback listener.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const CALLBACK_PATH: &str = "/callback";

const SUCCESS_HTML: &str = "<!doctype html><html><body><h1>Signed in</h1>\
<p>You can close this window and return to Data Wallet.</p></body></html>";
const FAILURE_HTML: &str = "<!doctype html><html><body><h1>Sign-in did not complete</h1>\
<p>Return to Data Wallet for details.</p></body></html>";
const STALE_HTML: &str = "<!doctype html><html><body><h1>Already handled</h1>\
<p>This sign-in attempt has already completed.</p></body></html>";

/// Redirect query parameters, as sent by the provider.
pub type CallbackParams = HashMap<String, String>;

/// One-shot handoff from the HTTP handler to the waiting prompt.
pub struct CallbackState {
    sender: Mutex<Option<oneshot::Sender<CallbackParams>>>,
}

impl CallbackState {
    pub fn new(sender: oneshot::Sender<CallbackParams>) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
        }
    }

    fn take_sender(&self) -> Option<oneshot::Sender<CallbackParams>> {
        match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

pub fn routes() -> Router<Arc<CallbackState>> {
    Router::new().route(CALLBACK_PATH, get(oauth_callback))
}

/// OAuth callback - forward the query to the prompt, render a page for the browser.
async fn oauth_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    // Prefetches and stray reloads carry neither; keep waiting for the real redirect
    if !params.contains_key("code") && !params.contains_key("error") {
        tracing::debug!("Callback without code or error ignored");
        return (StatusCode::BAD_REQUEST, Html(FAILURE_HTML));
    }

    let Some(sender) = state.take_sender() else {
        tracing::warn!("Duplicate OAuth callback ignored");
        return (StatusCode::CONFLICT, Html(STALE_HTML));
    };

    let succeeded = params.contains_key("code") && !params.contains_key("error");
    if let Some(error) = params.get("error") {
        tracing::warn!(error = %error, "OAuth error from Google");
    }

    if sender.send(params).is_err() {
        tracing::warn!("OAuth prompt stopped waiting before the callback arrived");
        return (StatusCode::GONE, Html(FAILURE_HTML));
    }

    if succeeded {
        (StatusCode::OK, Html(SUCCESS_HTML))
    } else {
        (StatusCode::BAD_REQUEST, Html(FAILURE_HTML))
    }
}
