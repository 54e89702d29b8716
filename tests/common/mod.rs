// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use datawallet::error::AppError;
use datawallet::services::{
    AuthFlowController, AuthRequest, AuthorizationPrompt, GoogleClient, GoogleEndpoints,
    MemorySecretStore, PromptResult, SecretStore,
};
use ratatui::buffer::Buffer;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

/// What the scripted prompt was asked to show.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub authorization_url: Url,
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Prompt that returns a fixed result instead of opening a browser.
#[derive(Clone)]
pub struct ScriptedPrompt {
    result: PromptResult,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl ScriptedPrompt {
    pub fn returning(result: PromptResult) -> Self {
        Self {
            result,
            seen: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Hold the prompt open until the returned gate is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// Successful redirect carrying `code`.
    pub fn success(code: &str) -> Self {
        let mut params = HashMap::new();
        params.insert("code".to_string(), code.to_string());
        Self::returning(PromptResult::Success {
            params,
            redirect_uri: redirect_uri(),
        })
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationPrompt for ScriptedPrompt {
    async fn prompt(&self, request: &AuthRequest, authorization_endpoint: &Url) -> PromptResult {
        self.seen.lock().unwrap().push(SeenRequest {
            authorization_url: request.authorization_url(authorization_endpoint, &redirect_uri()),
            code_verifier: request.code_verifier().to_string(),
            code_challenge: request.code_challenge().to_string(),
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }
}

/// Store whose every call fails.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl SecretStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Err(AppError::Storage("keychain locked".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
        Err(AppError::Storage("keychain locked".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), AppError> {
        Err(AppError::Storage("keychain locked".to_string()))
    }
}

pub fn redirect_uri() -> Url {
    Url::parse("http://127.0.0.1:8765/callback").unwrap()
}

/// Short wait for simulated providers so tests stay fast.
#[allow(dead_code)]
pub const TEST_MOCK_DELAY: Duration = Duration::from_millis(20);

/// Controller wired to endpoints under `base_url` with an in-memory store.
#[allow(dead_code)]
pub fn test_controller(
    base_url: &str,
    prompt: ScriptedPrompt,
) -> (
    AuthFlowController<MemorySecretStore, ScriptedPrompt>,
    MemorySecretStore,
) {
    let store = MemorySecretStore::new();
    let controller = test_controller_with_store(base_url, store.clone(), prompt);
    (controller, store)
}

#[allow(dead_code)]
pub fn test_controller_with_store<S: SecretStore, P: AuthorizationPrompt>(
    base_url: &str,
    store: S,
    prompt: P,
) -> AuthFlowController<S, P> {
    let endpoints = GoogleEndpoints::with_base(base_url).expect("valid mock base URL");
    let google = GoogleClient::with_endpoints("test-client".to_string(), endpoints);
    AuthFlowController::new(google, store, prompt, TEST_MOCK_DELAY)
}

/// Base URL where nothing listens.
#[allow(dead_code)]
pub const UNREACHABLE_BASE: &str = "http://127.0.0.1:1";

/// Screen contents as text, one line per row.
#[allow(dead_code)]
pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buffer.get(x, y).symbol());
        }
        out.push('\n');
    }
    out
}
