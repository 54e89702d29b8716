// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

/// Application error type surfaced to the screen as a banner message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Login was cancelled or failed.")]
    LoginCancelledOrFailed,

    #[error("Auth exchange failed: {0}")]
    AuthExchangeFailed(String),

    #[error("Revoke failed: {0}")]
    RevokeFailed(String),

    #[error("Secure storage error: {0}")]
    Storage(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True when the user aborted or the provider declined the login.
    pub fn is_login_cancelled(&self) -> bool {
        matches!(self, AppError::LoginCancelledOrFailed)
    }

    /// Wrap a storage failure that happened during the code exchange.
    pub(crate) fn into_exchange_failure(self) -> AppError {
        match self {
            AppError::Storage(msg) => AppError::AuthExchangeFailed(msg),
            other => other,
        }
    }

    /// Wrap a storage failure that happened during revocation.
    pub(crate) fn into_revoke_failure(self) -> AppError {
        match self {
            AppError::Storage(msg) => AppError::RevokeFailed(msg),
            other => other,
        }
    }
}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, AppError>;
