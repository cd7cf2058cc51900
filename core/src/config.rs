//! Client configuration.
//!
//! `ClientConfig` can be built in code or read from the environment:
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `TICKTICK_ACCESS_TOKEN` | yes | |
//! | `TICKTICK_BASE_URL` | no | [`DEFAULT_BASE_URL`] |
//! | `TICKTICK_TIMEOUT_SECS` | no | 30 |

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.ticktick.com";

/// Dida365, the mainland China deployment of the same API.
pub const DIDA365_BASE_URL: &str = "https://api.dida365.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_ACCESS_TOKEN: &str = "TICKTICK_ACCESS_TOKEN";
pub const ENV_BASE_URL: &str = "TICKTICK_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "TICKTICK_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// OAuth2 access token, sent as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Applies to the whole round-trip of one request.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let access_token = lookup(ENV_ACCESS_TOKEN)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_ACCESS_TOKEN} is not set")))?;
        let mut config = Self::new(access_token);
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got `{raw}`"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
