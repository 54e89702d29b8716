// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data Wallet terminal app
//!
//! Shows connectable accounts and lets the user sign in with Google (or
//! simulate Facebook/Amazon) and revoke access again.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use datawallet::{
    config::Config,
    services::{
        AuthFlowController, AuthorizationPrompt, FileSecretStore, LoopbackPrompt, SecretStore,
    },
    ui::App,
    Wallet,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_PATH: &str = ".datawallet/datawallet.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        secrets_path = %config.secrets_path.display(),
        redirect_port = config.redirect_port,
        "Starting Data Wallet"
    );

    let (url_tx, url_rx) = mpsc::unbounded_channel();
    let prompt = LoopbackPrompt::new(config.redirect_port, config.open_browser)
        .on_authorization_url(move |url| {
            let _ = url_tx.send(url.clone());
        });
    let dismiss = prompt.dismiss_handle();
    let store = FileSecretStore::new(config.secrets_path.clone());
    let wallet = Wallet::new(AuthFlowController::from_config(&config, store, prompt));

    let mut app = App::new(Arc::new(wallet))
        .with_sign_in_urls(url_rx)
        .with_dismiss(dismiss);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(&mut stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Data Wallet exited with an error");
    }
    result
}

async fn run_app<B, S, P>(terminal: &mut Terminal<B>, app: &mut App<S, P>) -> anyhow::Result<()>
where
    B: Backend,
    S: SecretStore + 'static,
    P: AuthorizationPrompt + 'static,
{
    while !app.should_quit() {
        app.draw(terminal).await?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }

        app.tick().await;
    }
    Ok(())
}

/// Initialize logging to a file so log lines do not tear the screen.
///
/// `DATAWALLET_LOG_PATH` picks the file and `DATAWALLET_LOG_FORMAT=json`
/// switches to structured JSON lines.
fn init_logging() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("datawallet=debug,info"));

    let path = std::env::var("DATAWALLET_LOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed creating log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;
    let writer = Mutex::new(file);

    let json = std::env::var("DATAWALLET_LOG_FORMAT").is_ok_and(|v| v == "json");

    if json {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(writer);
        tracing_subscriber::registry().with(filter).with(format).init();
    } else {
        let format = tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer);
        tracing_subscriber::registry().with(filter).with(format).init();
    }
    Ok(())
}
