//! Three-step connect modal: request, wait, confirmation.

use crate::models::Provider;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Wizard step inside the connect modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalStep {
    Request,
    Waiting,
    Confirmation,
}

impl ModalStep {
    pub fn index(&self) -> u8 {
        match self {
            ModalStep::Request => 0,
            ModalStep::Waiting => 1,
            ModalStep::Confirmation => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            ModalStep::Request => ModalStep::Waiting,
            ModalStep::Waiting | ModalStep::Confirmation => ModalStep::Confirmation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        provider: Provider,
        step: ModalStep,
    },
}

impl ModalState {
    /// Opening always starts at the request step.
    pub fn open(provider: Provider) -> Self {
        ModalState::Open {
            provider,
            step: ModalStep::Request,
        }
    }

    pub fn advance(self) -> Self {
        match self {
            ModalState::Closed => ModalState::Closed,
            ModalState::Open { provider, step } => ModalState::Open {
                provider,
                step: step.next(),
            },
        }
    }

    pub fn step(&self) -> Option<ModalStep> {
        match self {
            ModalState::Closed => None,
            ModalState::Open { step, .. } => Some(*step),
        }
    }
}

/// Text of the modal body for its current step, or `None` when closed.
pub fn modal_lines(
    modal: &ModalState,
    busy: bool,
    sign_in_url: Option<&str>,
) -> Option<Vec<Line<'static>>> {
    let ModalState::Open { provider, step } = modal else {
        return None;
    };
    let is_google = *provider == Provider::Google;

    let mut lines = Vec::new();
    match step {
        ModalStep::Request => {
            lines.push(Line::from(if is_google {
                "Sign in with Google to fetch your basic profile."
            } else {
                "Mock only in this build."
            }));
            lines.push(Line::from(""));
            let action = if is_google {
                "Sign in with Google"
            } else {
                "Continue"
            };
            let action = if busy {
                Span::styled(
                    format!("[Enter] {} (busy)", action),
                    Style::default().fg(Color::DarkGray),
                )
            } else {
                Span::styled(
                    format!("[Enter] {}", action),
                    Style::default().fg(Color::Yellow),
                )
            };
            lines.push(Line::from(vec![Span::raw("[Esc] Cancel  "), action]));
            if is_google {
                lines.push(Line::from(Span::styled(
                    "Requires setting GOOGLE_WEB_CLIENT_ID in .env",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        ModalStep::Waiting => {
            lines.push(Line::from("Opening secure sign-in..."));
            if let Some(url) = sign_in_url.filter(|_| is_google) {
                lines.push(Line::from(""));
                lines.push(Line::from("If no browser opened, visit:"));
                lines.push(Line::from(url.to_string()));
            }
            if is_google {
                lines.push(Line::from(""));
                lines.push(Line::from("[Esc] Stop waiting"));
            }
        }
        ModalStep::Confirmation => {
            lines.push(Line::from(Span::styled(
                format!("\u{2713} {} connected", provider),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from("[Enter] Done"));
        }
    }
    if is_google && *step != ModalStep::Waiting {
        lines.push(Line::from(""));
        lines.push(Line::from("[r] Revoke Google Access"));
    }
    Some(lines)
}

/// Draw the modal centered over the screen, if open.
pub fn render_modal(frame: &mut Frame, modal: &ModalState, busy: bool, sign_in_url: Option<&str>) {
    let ModalState::Open { provider, .. } = modal else {
        return;
    };
    let Some(lines) = modal_lines(modal, busy, sign_in_url) else {
        return;
    };

    let area = centered_rect(70, 16, frame.size());
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!("Connect {}", provider))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

/// `percent_x` of the width, `height` rows, centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
