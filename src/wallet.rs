// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet shell: runs controller operations and feeds their outcomes
//! through the state-transition function.

use crate::error::{AppError, Result};
use crate::models::Provider;
use crate::services::{AuthFlowController, AuthorizationPrompt, SecretStore};
use crate::state::{reduce, Event, WalletState};
use crate::ui::modal::{ModalState, ModalStep};
use tokio::sync::RwLock;

/// Controller plus the screen state it drives.
pub struct Wallet<S, P> {
    controller: AuthFlowController<S, P>,
    state: RwLock<WalletState>,
}

impl<S: SecretStore, P: AuthorizationPrompt> Wallet<S, P> {
    pub fn new(controller: AuthFlowController<S, P>) -> Self {
        Self {
            controller,
            state: RwLock::new(WalletState::new()),
        }
    }

    pub fn controller(&self) -> &AuthFlowController<S, P> {
        &self.controller
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> WalletState {
        self.state.read().await.clone()
    }

    /// Apply one event and return the resulting state.
    pub async fn dispatch(&self, event: Event) -> WalletState {
        let mut guard = self.state.write().await;
        let next = reduce(std::mem::take(&mut *guard), event);
        *guard = next.clone();
        next
    }

    /// Mark an operation as started, unless one is already running.
    ///
    /// This only guards callers going through the wallet; the controller
    /// itself does not prevent concurrent calls.
    async fn begin(&self) -> Result<()> {
        let mut guard = self.state.write().await;
        if guard.busy {
            return Err(AppError::Busy);
        }
        *guard = reduce(std::mem::take(&mut *guard), Event::Started);
        Ok(())
    }

    /// Connect an account and update the screen.
    pub async fn connect(&self, provider: Provider) -> Result<()> {
        self.begin().await?;
        self.finish_connect(provider).await
    }

    async fn finish_connect(&self, provider: Provider) -> Result<()> {
        match self.controller.connect(provider).await {
            Ok(outcome) => {
                self.dispatch(outcome.into()).await;
                Ok(())
            }
            Err(e) => {
                self.dispatch(Event::Failed {
                    message: e.user_message(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Revoke an account and update the screen.
    pub async fn revoke(&self, provider: Provider) -> Result<()> {
        self.begin().await?;
        match self.controller.revoke(provider).await {
            Ok(outcome) => {
                self.dispatch(outcome.into()).await;
                Ok(())
            }
            Err(e) => {
                self.dispatch(Event::Failed {
                    message: e.user_message(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Show the connect modal at its request step.
    pub async fn open_modal(&self, provider: Provider) -> WalletState {
        self.dispatch(Event::ModalOpened { provider }).await
    }

    /// Cancel or dismiss the modal.
    pub async fn close_modal(&self) -> WalletState {
        self.dispatch(Event::ModalClosed).await
    }

    /// Accept the request step: show the waiting step and connect.
    ///
    /// On success the modal stays open at the confirmation step until
    /// closed. A failed sign-in closes it and the banner carries the error.
    /// Does nothing unless the modal is at its request step.
    pub async fn confirm_modal(&self) -> Result<()> {
        let provider = {
            let mut guard = self.state.write().await;
            let ModalState::Open {
                provider,
                step: ModalStep::Request,
            } = guard.modal
            else {
                tracing::debug!("Modal confirm ignored outside the request step");
                return Ok(());
            };
            if guard.busy {
                return Err(AppError::Busy);
            }
            let next = reduce(std::mem::take(&mut *guard), Event::ModalAdvanced);
            *guard = reduce(next, Event::Started);
            provider
        };

        let result = self.finish_connect(provider).await;
        match &result {
            Ok(()) => self.dispatch(Event::ModalAdvanced).await,
            Err(_) => self.close_modal().await,
        };
        result
    }
}
