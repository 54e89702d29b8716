// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key handling for the wallet screen.
//!
//! Connects and revokes run on background tasks so the screen keeps
//! redrawing while a sign-in is waiting on the browser.

use crate::error::{AppError, Result};
use crate::models::Provider;
use crate::services::{AuthorizationPrompt, DismissHandle, SecretStore};
use crate::shell::{Command, HELP_LINE};
use crate::state::Event;
use crate::ui::modal::{ModalState, ModalStep};
use crate::ui::{render_screen, View};
use crate::wallet::Wallet;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use url::Url;

#[derive(Debug, Clone, Copy)]
enum Action {
    Connect(Provider),
    Revoke(Provider),
}

struct Pending {
    action: Action,
    handle: JoinHandle<Result<()>>,
}

pub struct App<S, P> {
    wallet: Arc<Wallet<S, P>>,
    selected: usize,
    status: String,
    palette: Option<String>,
    sign_in_url: Option<String>,
    sign_in_urls: Option<mpsc::UnboundedReceiver<Url>>,
    dismiss: Option<DismissHandle>,
    pending: Option<Pending>,
    quit: bool,
}

impl<S, P> App<S, P>
where
    S: SecretStore + 'static,
    P: AuthorizationPrompt + 'static,
{
    pub fn new(wallet: Arc<Wallet<S, P>>) -> Self {
        Self {
            wallet,
            selected: 0,
            status: String::new(),
            palette: None,
            sign_in_url: None,
            sign_in_urls: None,
            dismiss: None,
            pending: None,
            quit: false,
        }
    }

    /// Consent URLs reported by the prompt, shown while waiting.
    pub fn with_sign_in_urls(mut self, urls: mpsc::UnboundedReceiver<Url>) -> Self {
        self.sign_in_urls = Some(urls);
        self
    }

    /// Handle used by Esc/Ctrl-C to stop waiting for the browser.
    pub fn with_dismiss(mut self, dismiss: DismissHandle) -> Self {
        self.dismiss = Some(dismiss);
        self
    }

    pub fn wallet(&self) -> &Arc<Wallet<S, P>> {
        &self.wallet
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn view(&self) -> View<'_> {
        View {
            selected: self.selected,
            status: &self.status,
            palette: self.palette.as_deref(),
            sign_in_url: self.sign_in_url.as_deref(),
        }
    }

    pub async fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> std::io::Result<()> {
        let state = self.wallet.snapshot().await;
        let view = self.view();
        terminal.draw(|frame| render_screen(frame, &state, &view))?;
        Ok(())
    }

    /// Pick up consent URLs and finished background work.
    pub async fn tick(&mut self) {
        if let Some(urls) = self.sign_in_urls.as_mut() {
            while let Ok(url) = urls.try_recv() {
                self.sign_in_url = Some(url.to_string());
            }
        }

        if self.pending.as_ref().is_some_and(|p| p.handle.is_finished()) {
            self.settle().await;
        }
    }

    /// Wait for the background operation, if any, and report its result.
    pub async fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            let result = pending.handle.await;
            self.finish(pending.action, result);
        }
    }

    fn finish(&mut self, action: Action, result: std::result::Result<Result<()>, JoinError>) {
        self.sign_in_url = None;
        self.status = match (action, result) {
            (Action::Connect(provider), Ok(Ok(()))) => format!("{} connected", provider),
            (Action::Revoke(provider), Ok(Ok(()))) => format!("{} access revoked", provider),
            (_, Ok(Err(e))) => e.user_message(),
            (_, Err(e)) => {
                tracing::error!(error = %e, "Background task failed");
                "Something went wrong.".to_string()
            }
        };
    }

    fn start(&mut self, action: Action) {
        if self.pending.is_some() {
            self.status = AppError::Busy.user_message();
            return;
        }

        let wallet = self.wallet.clone();
        let handle = match action {
            Action::Connect(provider) => {
                self.status = format!("Connecting {}...", provider);
                tokio::spawn(async move { wallet.confirm_modal().await })
            }
            Action::Revoke(provider) => {
                self.status = format!("Revoking {}...", provider);
                tokio::spawn(async move { wallet.revoke(provider).await })
            }
        };
        self.pending = Some(Pending { action, handle });
    }

    fn selected_provider(&self) -> Provider {
        Provider::ALL[self.selected.min(Provider::ALL.len() - 1)]
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');

        if let Some(input) = self.palette.as_mut() {
            match key.code {
                _ if ctrl_c => self.quit = true,
                KeyCode::Esc => self.palette = None,
                KeyCode::Enter => {
                    let line = std::mem::take(input);
                    self.palette = None;
                    self.execute_command(&line).await;
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return;
        }

        let state = self.wallet.snapshot().await;
        match state.modal {
            ModalState::Open {
                step: ModalStep::Waiting,
                provider,
            } => {
                if ctrl_c || key.code == KeyCode::Esc {
                    match (&self.dismiss, provider) {
                        (Some(dismiss), Provider::Google) => {
                            dismiss.dismiss();
                            self.status = "Sign-in dismissed".to_string();
                        }
                        _ => self.status = "Please wait...".to_string(),
                    }
                }
            }
            ModalState::Open { step, provider } => match key.code {
                _ if ctrl_c => self.quit = true,
                KeyCode::Enter if step == ModalStep::Request => {
                    self.start(Action::Connect(provider))
                }
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => {
                    self.wallet.close_modal().await;
                }
                KeyCode::Char('r') if provider == Provider::Google => {
                    self.wallet.close_modal().await;
                    self.start(Action::Revoke(Provider::Google));
                }
                _ => {}
            },
            ModalState::Closed => match key.code {
                _ if ctrl_c => self.quit = true,
                KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selected = (self.selected + 1).min(Provider::ALL.len() - 1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Enter | KeyCode::Char('c') => {
                    self.wallet.open_modal(self.selected_provider()).await;
                }
                KeyCode::Char('r') => self.start(Action::Revoke(self.selected_provider())),
                KeyCode::Char('d') => {
                    self.wallet.dispatch(Event::ErrorDismissed).await;
                }
                KeyCode::Char(':') => self.palette = Some(String::new()),
                _ => {}
            },
        }
    }

    async fn execute_command(&mut self, line: &str) {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                self.status = e.user_message();
                return;
            }
        };

        match command {
            Command::Connect(provider) => {
                if let Some(index) = Provider::ALL.iter().position(|p| *p == provider) {
                    self.selected = index;
                }
                self.wallet.open_modal(provider).await;
            }
            Command::Revoke(provider) => self.start(Action::Revoke(provider)),
            Command::Show => self.status.clear(),
            Command::Dismiss => {
                self.wallet.dispatch(Event::ErrorDismissed).await;
            }
            Command::Help => self.status = HELP_LINE.to_string(),
            Command::Quit => self.quit = true,
        }
    }
}
