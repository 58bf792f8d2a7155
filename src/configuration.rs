use std::collections::HashMap;
use tracing::debug;

/// Environment variable overriding the HTTP request timeout, in seconds
pub const HTTP_TIMEOUT_ENV_VAR: &str = "NEPTUNE_HTTP_TIMEOUT";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("neptune-lib/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidPropertyValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Transport settings shared by every request a client makes
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra headers added to every request
    pub default_headers: HashMap<String, String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HashMap::new(),
        }
    }
}

impl Configuration {
    /// Default configuration with overrides taken from the environment
    pub fn from_env() -> Result<Configuration, ConfigurationError> {
        let mut configuration = Configuration::default();

        if let Ok(value) = std::env::var(HTTP_TIMEOUT_ENV_VAR) {
            configuration.timeout_secs = parse_timeout(&value)?;
            debug!(
                "Using HTTP timeout of {}s from {}",
                configuration.timeout_secs, HTTP_TIMEOUT_ENV_VAR
            );
        }

        Ok(configuration)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

fn parse_timeout(value: &str) -> Result<u64, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidPropertyValue {
        name: HTTP_TIMEOUT_ENV_VAR.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid("timeout must be greater than zero")),
        Ok(secs) => Ok(secs),
        Err(e) => Err(invalid(&e.to_string())),
    }
}
