//! Client configuration.
//!
//! A `ClientConfig` is passed to `RemoteClient` at construction and never
//! mutated afterwards, so clients pointed at different endpoints can live
//! side by side (the integration tests run one per mock server).

use std::time::Duration;

use crate::error::BridgeError;

pub const DEFAULT_URL: &str = "http://localhost:8765";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// AnkiConnect protocol version sent with every request.
pub const API_VERSION: u32 = 6;

pub const URL_ENV: &str = "ANKI_CONNECT_URL";
pub const TIMEOUT_ENV: &str = "ANKI_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `ANKI_CONNECT_URL` and `ANKI_CONNECT_TIMEOUT_SECS`, falling back
    /// to the defaults for whichever is unset.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let mut config = match lookup(URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                BridgeError::InvalidArgument(format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"))
            })?;
            if secs == 0 {
                return Err(BridgeError::InvalidArgument(format!("{TIMEOUT_ENV} must be positive")));
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
