// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Connectable third-party accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Third-party service a user can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Google,
    Facebook,
    Amazon,
}

impl Provider {
    /// All providers, in screen order.
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Facebook, Provider::Amazon];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Facebook => "Facebook",
            Provider::Amazon => "Amazon",
        }
    }

    /// Data categories the provider is known to hold.
    pub fn data_categories(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["Search history", "Location history", "Ad interests"],
            Provider::Facebook => &["Liked pages", "Ad preferences", "Friends list"],
            Provider::Amazon => &["Purchase history", "Wishlist", "Payment methods"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "facebook" => Ok(Provider::Facebook),
            "amazon" => Ok(Provider::Amazon),
            other => Err(AppError::UnknownProvider(other.to_string())),
        }
    }
}

/// A connectable account card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Which service this card represents
    pub provider: Provider,
    /// Categories of data the service holds, in display order
    pub data: Vec<String>,
    /// Whether a connection is currently active
    pub connected: bool,
}

impl Account {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            data: provider
                .data_categories()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            connected: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }
}

/// The fixed list of accounts shown at startup.
pub fn seed_accounts() -> Vec<Account> {
    Provider::ALL.into_iter().map(Account::new).collect()
}
