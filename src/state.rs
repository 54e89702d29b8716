// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Screen state and its transition function.
//!
//! All state changes go through [`reduce`], so callers on any task can apply
//! events without racing on individual fields.

use crate::models::{seed_accounts, Account, Profile, Provider};
use crate::services::{ConnectOutcome, RevokeOutcome};
use crate::ui::modal::ModalState;

/// Everything the screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
    pub accounts: Vec<Account>,
    /// Google profile; at most one at a time.
    pub profile: Option<Profile>,
    /// An operation is in flight.
    pub busy: bool,
    /// Banner message from the last failed operation.
    pub error: Option<String>,
    pub modal: ModalState,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            accounts: seed_accounts(),
            profile: None,
            busy: false,
            error: None,
            modal: ModalState::Closed,
        }
    }
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, provider: Provider) -> Option<&Account> {
        self.accounts.iter().find(|a| a.provider == provider)
    }

    pub fn is_connected(&self, provider: Provider) -> bool {
        self.account(provider).is_some_and(|a| a.connected)
    }

    /// At least one account is connected.
    pub fn any_connected(&self) -> bool {
        self.accounts.iter().any(|a| a.connected)
    }

    fn set_connected(&mut self, provider: Provider, connected: bool) {
        if let Some(account) = self.accounts.iter_mut().find(|a| a.provider == provider) {
            account.connected = connected;
        }
    }

    pub fn apply(self, event: Event) -> Self {
        reduce(self, event)
    }
}

/// Something that happened to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A connect or revoke began.
    Started,
    Connected {
        provider: Provider,
        profile: Option<Profile>,
    },
    Revoked {
        provider: Provider,
    },
    Failed {
        message: String,
    },
    ModalOpened {
        provider: Provider,
    },
    ModalAdvanced,
    ModalClosed,
    ErrorDismissed,
}

impl From<ConnectOutcome> for Event {
    fn from(outcome: ConnectOutcome) -> Self {
        Event::Connected {
            provider: outcome.provider,
            profile: outcome.profile,
        }
    }
}

impl From<RevokeOutcome> for Event {
    fn from(outcome: RevokeOutcome) -> Self {
        Event::Revoked {
            provider: outcome.provider,
        }
    }
}

/// Compute the next state.
pub fn reduce(mut state: WalletState, event: Event) -> WalletState {
    match event {
        Event::Started => {
            state.busy = true;
            state.error = None;
        }
        Event::Connected { provider, profile } => {
            state.set_connected(provider, true);
            if profile.is_some() {
                state.profile = profile;
            }
            state.busy = false;
        }
        Event::Revoked { provider } => {
            state.set_connected(provider, false);
            if provider == Provider::Google {
                state.profile = None;
            }
            state.busy = false;
        }
        Event::Failed { message } => {
            state.error = Some(message);
            state.busy = false;
        }
        Event::ModalOpened { provider } => {
            state.modal = ModalState::open(provider);
        }
        Event::ModalAdvanced => {
            state.modal = state.modal.advance();
        }
        Event::ModalClosed => {
            state.modal = ModalState::Closed;
        }
        Event::ErrorDismissed => {
            state.error = None;
        }
    }
    state
}
