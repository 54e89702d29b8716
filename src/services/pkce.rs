// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PKCE authorization requests (RFC 7636, S256).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use url::Url;

/// Scopes requested for the Google sign-in.
pub const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// PKCE code verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Generate a random 43-character verifier and derive the challenge.
    pub fn generate() -> Self {
        let verifier = random_urlsafe(32);
        let challenge = challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

/// S256 challenge for a verifier.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// An authorization-code request with its PKCE secret and CSRF state.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    pkce: PkcePair,
    state: String,
}

impl AuthRequest {
    pub fn new(client_id: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            client_id: client_id.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            pkce: PkcePair::generate(),
            state: random_urlsafe(16),
        }
    }

    pub fn code_verifier(&self) -> &str {
        self.pkce.verifier()
    }

    pub fn code_challenge(&self) -> &str {
        self.pkce.challenge()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Constant-time comparison against the `state` echoed by the redirect.
    pub fn state_matches(&self, returned: &str) -> bool {
        self.state.as_bytes().ct_eq(returned.as_bytes()).into()
    }

    /// Build the URL the user is sent to for consent.
    pub fn authorization_url(&self, endpoint: &Url, redirect_uri: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("code_challenge", self.pkce.challenge())
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &self.state);
        url
    }
}
