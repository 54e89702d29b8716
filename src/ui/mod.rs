// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terminal rendering of the wallet screen.

pub mod app;
pub mod modal;

use crate::models::Account;
use crate::state::WalletState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub use app::App;

const KEY_HELP: &str =
    "j/k=move  enter=connect  r=revoke  d=dismiss error  :=command  q=quit";

/// Per-frame UI state that lives outside `WalletState`.
#[derive(Debug, Default, Clone, Copy)]
pub struct View<'a> {
    /// Index of the highlighted account card
    pub selected: usize,
    /// One-line status under the cards
    pub status: &'a str,
    /// Command palette input, when the palette is open
    pub palette: Option<&'a str>,
    /// Consent URL of the sign-in in progress
    pub sign_in_url: Option<&'a str>,
}

/// Draw the full screen: header, cards, banners, and the modal if open.
pub fn render_screen(frame: &mut Frame, state: &WalletState, view: &View) {
    let mut constraints = vec![Constraint::Length(4)];
    for account in &state.accounts {
        constraints.push(Constraint::Length(card_height(account)));
    }
    if state.profile.is_some() {
        constraints.push(Constraint::Length(5));
    }
    if state.any_connected() {
        constraints.push(Constraint::Length(4));
    }
    if state.error.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.size());
    let mut areas = chunks.iter().copied();
    let mut next_area = || areas.next().unwrap_or_default();

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Take control of your data",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Connect a service to see what data it holds and take action."),
    ])
    .block(Block::default().title("Data Wallet").borders(Borders::ALL));
    frame.render_widget(header, next_area());

    for (index, account) in state.accounts.iter().enumerate() {
        render_account_card(frame, next_area(), account, index == view.selected);
    }

    if let Some(profile) = &state.profile {
        let mut lines = vec![
            Line::from(profile.name.clone().unwrap_or_default()),
            Line::from(profile.email.clone().unwrap_or_default()),
        ];
        if let Some(picture) = &profile.picture {
            lines.push(Line::from(format!("picture: {}", picture)));
        }
        let card = Paragraph::new(lines)
            .block(Block::default().title("Google Profile").borders(Borders::ALL));
        frame.render_widget(card, next_area());
    }

    if state.any_connected() {
        let card = Paragraph::new(
            "Your data is stored locally in an encrypted vault (demo). \
             You can revoke access anytime.",
        )
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Security Status").borders(Borders::ALL));
        frame.render_widget(card, next_area());
    }

    if let Some(error) = &state.error {
        let banner = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Error").borders(Borders::ALL));
        frame.render_widget(banner, next_area());
    }

    // Filler
    next_area();

    let status = Paragraph::new(view.status).style(Style::default().fg(Color::Cyan));
    frame.render_widget(status, next_area());

    let bottom = next_area();
    match view.palette {
        Some(input) => {
            let prompt =
                Paragraph::new(format!(":{}", input)).style(Style::default().fg(Color::Yellow));
            frame.render_widget(prompt, bottom);
        }
        None => frame.render_widget(Paragraph::new(KEY_HELP), bottom),
    }

    modal::render_modal(frame, &state.modal, state.busy, view.sign_in_url);
}

fn card_height(account: &Account) -> u16 {
    let body = if account.connected {
        1 + account.data.len()
    } else {
        1
    };
    u16::try_from(body + 2).unwrap_or(u16::MAX)
}

fn render_account_card(frame: &mut Frame, area: Rect, account: &Account, selected: bool) {
    let (chip, chip_style) = if account.connected {
        ("[Connected]", Style::default().fg(Color::Green))
    } else {
        ("[Connect]", Style::default().fg(Color::DarkGray))
    };
    let title = Line::from(vec![
        Span::raw(format!("{} ", account.name())),
        Span::styled(chip, chip_style),
    ]);

    let lines: Vec<Line> = if account.connected {
        std::iter::once(Line::from("Data they store:"))
            .chain(
                account
                    .data
                    .iter()
                    .map(|item| Line::from(format!("  \u{2022} {}", item))),
            )
            .collect()
    } else {
        vec![Line::from(format!(
            "See and control: {}",
            account.data.join(", ")
        ))]
    };

    let border_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let card = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(card, area);
}
