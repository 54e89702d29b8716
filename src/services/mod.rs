// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - auth flow and its collaborators.

pub mod controller;
pub mod google;
pub mod pkce;
pub mod prompt;
pub mod secure_store;

pub use controller::{AuthFlowController, ConnectMode, ConnectOutcome, RevokeOutcome};
pub use google::{GoogleClient, GoogleEndpoints};
pub use pkce::{AuthRequest, PkcePair};
pub use prompt::{AuthorizationPrompt, DismissHandle, LoopbackPrompt, PromptResult};
pub use secure_store::{FileSecretStore, MemorySecretStore, SecretStore, GOOGLE_REFRESH_TOKEN_KEY};
