use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};

/// Default origin of the remote API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default directory holding the persisted session entries.
pub const DEFAULT_SESSION_DIR: &str = ".geoportal";
/// Default domain of the placeholder email built at login.
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base origin every endpoint path is appended to.
    pub api_url: String,
    /// The directory holding the persisted token and user record.
    pub session_dir: PathBuf,
    /// Request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    /// The domain used for the placeholder email.
    pub email_domain: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            request_timeout: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let request_timeout = match env::var("GEOPORTAL_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .parse()
                    .context("Invalid GEOPORTAL_REQUEST_TIMEOUT_SECS")?;
                if secs == 0 {
                    anyhow::bail!("GEOPORTAL_REQUEST_TIMEOUT_SECS must be greater than zero");
                }
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let api_url = env::var("GEOPORTAL_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: normalize_api_url(&api_url)?,
            session_dir: env::var("GEOPORTAL_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_DIR)),
            request_timeout,
            email_domain: env::var("GEOPORTAL_EMAIL_DOMAIN")
                .unwrap_or_else(|_| DEFAULT_EMAIL_DOMAIN.to_string()),
        })
    }

    /// Replaces the API origin, e.g. from a command-line flag.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }
}

/// Trims trailing slashes so endpoint paths can be appended verbatim.
fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        anyhow::bail!("API URL must start with http:// or https:// (got {:?})", raw);
    }
    Ok(trimmed.to_string())
}
