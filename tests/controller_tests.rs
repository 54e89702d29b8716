// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth flow controller tests against a mock Google.
//!
//! These tests verify that:
//! 1. A successful sign-in stores the refresh token and returns the profile
//! 2. Cancelled prompts change nothing
//! 3. Exchange/profile failures surface as AuthExchangeFailed without rollback
//! 4. Revocation deletes the stored token whatever the endpoint answers

use datawallet::error::AppError;
use datawallet::models::{Profile, Provider};
use datawallet::services::pkce::challenge_for;
use datawallet::services::{
    ConnectMode, PromptResult, RevokeOutcome, SecretStore, GOOGLE_REFRESH_TOKEN_KEY,
};
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

mod common;
use common::{
    test_controller, test_controller_with_store, FailingStore, ScriptedPrompt, TEST_MOCK_DELAY,
    UNREACHABLE_BASE,
};

#[tokio::test]
async fn test_google_connect_scenario() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("code=abc123")
                .body_contains("grant_type=authorization_code")
                .body_contains("client_id=test-client")
                .body_contains("code_verifier=");
            then.status(200).json_body(json!({
                "access_token": "at1",
                "refresh_token": "rt1",
                "expires_in": 3599,
                "scope": "openid email profile",
                "token_type": "Bearer"
            }));
        })
        .await;
    let userinfo_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/oauth2/v3/userinfo")
                .header("authorization", "Bearer at1");
            then.status(200)
                .json_body(json!({"name": "Jane", "email": "jane@x.com"}));
        })
        .await;

    let prompt = ScriptedPrompt::success("abc123");
    let (controller, store) = test_controller(&server.base_url(), prompt.clone());

    let outcome = controller.connect(Provider::Google).await.unwrap();

    token_mock.assert_async().await;
    userinfo_mock.assert_async().await;
    assert_eq!(outcome.provider, Provider::Google);
    assert_eq!(
        outcome.profile,
        Some(Profile {
            name: Some("Jane".to_string()),
            email: Some("jane@x.com".to_string()),
            ..Default::default()
        })
    );
    assert_eq!(
        store.get(GOOGLE_REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("rt1")
    );

    // The challenge shown to the user belongs to the verifier that was exchanged
    let seen = prompt.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].code_challenge, challenge_for(&seen[0].code_verifier));
    let scope = seen[0]
        .authorization_url
        .query_pairs()
        .find(|(k, _)| k == "scope")
        .map(|(_, v)| v.into_owned());
    assert_eq!(scope.as_deref(), Some("openid email profile"));
}

#[tokio::test]
async fn test_connect_without_refresh_token_keeps_stored_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({"access_token": "at2"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/oauth2/v3/userinfo");
            then.status(200).json_body(json!({"name": "Jane"}));
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("c"));
    store.set(GOOGLE_REFRESH_TOKEN_KEY, "old").await.unwrap();

    let outcome = controller.connect(Provider::Google).await.unwrap();

    assert!(outcome.profile.is_some());
    assert_eq!(
        store.get(GOOGLE_REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("old")
    );
}

#[tokio::test]
async fn test_cancelled_prompt_is_login_cancelled() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({"access_token": "at"}));
        })
        .await;

    for result in [
        PromptResult::Cancel,
        PromptResult::Dismiss,
        PromptResult::Error {
            message: "authorization state mismatch".to_string(),
        },
    ] {
        let (controller, store) =
            test_controller(&server.base_url(), ScriptedPrompt::returning(result));
        let err = controller.connect(Provider::Google).await.unwrap_err();
        assert!(err.is_login_cancelled(), "unexpected error: {err:?}");
        assert!(store.is_empty());
    }

    assert_eq!(token_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_success_without_code_is_login_cancelled() {
    let prompt = ScriptedPrompt::returning(PromptResult::Success {
        params: Default::default(),
        redirect_uri: common::redirect_uri(),
    });
    let (controller, _store) = test_controller(UNREACHABLE_BASE, prompt);

    let err = controller.connect(Provider::Google).await.unwrap_err();
    assert!(matches!(err, AppError::LoginCancelledOrFailed));
    assert_eq!(err.user_message(), "Login was cancelled or failed.");
}

#[tokio::test]
async fn test_token_endpoint_error_is_exchange_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Malformed auth code."
            }));
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("bad"));

    match controller.connect(Provider::Google).await {
        Err(AppError::AuthExchangeFailed(msg)) => {
            assert!(msg.contains("invalid_grant"), "message: {msg}");
            assert!(msg.contains("Malformed auth code."), "message: {msg}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_userinfo_failure_keeps_written_refresh_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .json_body(json!({"access_token": "at1", "refresh_token": "rt1"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/oauth2/v3/userinfo");
            then.status(500).body("backend error");
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("c"));

    let err = controller.connect(Provider::Google).await.unwrap_err();
    assert!(matches!(err, AppError::AuthExchangeFailed(_)));
    assert_eq!(
        store.get(GOOGLE_REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("rt1")
    );
}

#[tokio::test]
async fn test_network_error_during_exchange() {
    let (controller, _store) = test_controller(UNREACHABLE_BASE, ScriptedPrompt::success("c"));
    let err = controller.connect(Provider::Google).await.unwrap_err();
    assert!(matches!(err, AppError::AuthExchangeFailed(_)));
}

#[tokio::test]
async fn test_storage_error_during_exchange() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .json_body(json!({"access_token": "at1", "refresh_token": "rt1"}));
        })
        .await;

    let controller =
        test_controller_with_store(&server.base_url(), FailingStore, ScriptedPrompt::success("c"));
    match controller.connect(Provider::Google).await {
        Err(AppError::AuthExchangeFailed(msg)) => assert!(msg.contains("keychain locked")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_revoke_deletes_stored_token() {
    let server = MockServer::start_async().await;
    let revoke_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/revoke")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("token=1%2F%2Frt%2Bslash");
            then.status(200);
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("c"));
    store
        .set(GOOGLE_REFRESH_TOKEN_KEY, "1//rt+slash")
        .await
        .unwrap();

    let outcome = controller.revoke(Provider::Google).await.unwrap();

    revoke_mock.assert_async().await;
    assert_eq!(
        outcome,
        RevokeOutcome {
            provider: Provider::Google,
            token_deleted: true
        }
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_revoke_deletes_token_even_when_endpoint_rejects() {
    let server = MockServer::start_async().await;
    let revoke_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/revoke");
            then.status(400).json_body(json!({"error": "invalid_token"}));
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("c"));
    store.set(GOOGLE_REFRESH_TOKEN_KEY, "rt1").await.unwrap();

    let outcome = controller.revoke(Provider::Google).await.unwrap();

    revoke_mock.assert_async().await;
    assert!(outcome.token_deleted);
    assert_eq!(store.get(GOOGLE_REFRESH_TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_revoke_without_token_makes_no_request() {
    let server = MockServer::start_async().await;
    let revoke_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/revoke");
            then.status(200);
        })
        .await;

    let (controller, store) = test_controller(&server.base_url(), ScriptedPrompt::success("c"));

    let outcome = controller.revoke(Provider::Google).await.unwrap();

    assert!(!outcome.token_deleted);
    assert_eq!(revoke_mock.hits_async().await, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_revoke_network_error_keeps_token() {
    let (controller, store) = test_controller(UNREACHABLE_BASE, ScriptedPrompt::success("c"));
    store.set(GOOGLE_REFRESH_TOKEN_KEY, "rt1").await.unwrap();

    let err = controller.revoke(Provider::Google).await.unwrap_err();

    assert!(matches!(err, AppError::RevokeFailed(_)));
    assert_eq!(
        store.get(GOOGLE_REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("rt1")
    );
}

#[tokio::test]
async fn test_revoke_storage_error_is_revoke_failure() {
    let controller =
        test_controller_with_store(UNREACHABLE_BASE, FailingStore, ScriptedPrompt::success("c"));
    let err = controller.revoke(Provider::Google).await.unwrap_err();
    assert!(matches!(err, AppError::RevokeFailed(msg) if msg.contains("keychain locked")));
}

#[tokio::test]
async fn test_simulated_connect_needs_no_network() {
    let prompt = ScriptedPrompt::success("unused");
    let (controller, store) = test_controller(UNREACHABLE_BASE, prompt.clone());

    assert_eq!(
        controller.mode(Provider::Facebook),
        ConnectMode::Simulated {
            delay: TEST_MOCK_DELAY
        }
    );

    let started = Instant::now();
    let outcome = controller.connect(Provider::Facebook).await.unwrap();

    assert!(started.elapsed() >= TEST_MOCK_DELAY);
    assert_eq!(outcome.provider, Provider::Facebook);
    assert!(outcome.profile.is_none());
    assert!(prompt.seen().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_connect_immediately() {
    let (controller, _store) = test_controller(UNREACHABLE_BASE, ScriptedPrompt::success("c"));

    let outcome = controller.connect_immediately(Provider::Amazon).unwrap();
    assert_eq!(outcome.provider, Provider::Amazon);
    assert!(outcome.profile.is_none());

    assert_eq!(controller.mode(Provider::Google), ConnectMode::OAuth);
    assert!(controller.connect_immediately(Provider::Google).is_none());
}

#[tokio::test]
async fn test_revoke_simulated_provider() {
    let (controller, _store) = test_controller(UNREACHABLE_BASE, ScriptedPrompt::success("c"));
    let outcome = controller.revoke(Provider::Amazon).await.unwrap();
    assert_eq!(outcome.provider, Provider::Amazon);
    assert!(!outcome.token_deleted);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_simulated_delay_logged_without_truncation() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let controller = datawallet::services::AuthFlowController::new(
        datawallet::services::GoogleClient::new("test-client".to_string()),
        datawallet::services::MemorySecretStore::new(),
        ScriptedPrompt::success("unused"),
        Duration::from_micros(1500),
    );
    controller.connect(Provider::Amazon).await.unwrap();

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("Simulating connection"));
    assert!(text.contains("delay=1.5ms"), "{text}");
}
