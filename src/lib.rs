// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data Wallet: see and revoke what third-party services hold about you
//!
//! This crate connects a Google account through OAuth2 with PKCE (Facebook
//! and Amazon are simulated), keeps the refresh token in secure storage, and
//! renders the accounts screen as text.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shell;
pub mod state;
pub mod ui;
pub mod wallet;

pub use state::{reduce, Event, WalletState};
pub use wallet::Wallet;
