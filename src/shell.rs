//! Commands accepted by the `:` command palette.

use crate::error::AppError;
use crate::models::Provider;
use std::str::FromStr;

/// Shown in the status line for `help`.
pub const HELP_LINE: &str = "Commands: connect <google|facebook|amazon>, revoke [provider], \
show, dismiss, help, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect(Provider),
    Revoke(Provider),
    Show,
    Dismiss,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("show").to_ascii_lowercase();
        let arg = words.next();

        match verb.as_str() {
            "connect" => {
                let provider = arg.ok_or_else(|| AppError::UnknownProvider(String::new()))?;
                Ok(Command::Connect(provider.parse()?))
            }
            "revoke" => match arg {
                Some(provider) => Ok(Command::Revoke(provider.parse()?)),
                None => Ok(Command::Revoke(Provider::Google)),
            },
            "show" | "ls" => Ok(Command::Show),
            "dismiss" => Ok(Command::Dismiss),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(AppError::UnknownCommand(other.to_string())),
        }
    }
}
