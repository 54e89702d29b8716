// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod profile;

pub use account::{seed_accounts, Account, Provider};
pub use profile::{Profile, TokenResponse, TokenSet};
