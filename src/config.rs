//! Application configuration loaded from environment variables.
//!
//! The Google client ID is public and injected at build/deploy time. Its
//! absence is not treated as fatal: the token exchange will fail later and the
//! error surfaces on screen.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default wait for the simulated (non-Google) connections.
pub const DEFAULT_MOCK_DELAY_MS: u64 = 1200;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth web client ID (public)
    pub google_client_id: String,
    /// Loopback port for the OAuth redirect (0 picks a free port)
    pub redirect_port: u16,
    /// Delay before a simulated connection completes
    pub mock_connect_delay: Duration,
    /// Location of the file-backed secure store
    pub secrets_path: PathBuf,
    /// Launch the system browser for the Google sign-in
    pub open_browser: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            google_client_id: "test_client_id.apps.googleusercontent.com".to_string(),
            redirect_port: 0,
            mock_connect_delay: Duration::from_millis(DEFAULT_MOCK_DELAY_MS),
            secrets_path: PathBuf::from(".datawallet/secrets.json"),
            open_browser: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let google_client_id = env::var("GOOGLE_WEB_CLIENT_ID")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if google_client_id.is_empty() {
            tracing::warn!("GOOGLE_WEB_CLIENT_ID is not set; Google sign-in will fail");
        }

        Ok(Self {
            google_client_id,
            redirect_port: parse_var("DATAWALLET_REDIRECT_PORT", 0)?,
            mock_connect_delay: Duration::from_millis(parse_var(
                "DATAWALLET_MOCK_DELAY_MS",
                DEFAULT_MOCK_DELAY_MS,
            )?),
            secrets_path: env::var("DATAWALLET_SECRETS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".datawallet/secrets.json")),
            open_browser: parse_var("DATAWALLET_OPEN_BROWSER", true)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
