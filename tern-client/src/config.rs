//! Client configuration from `tern.toml`.
//!
//! ```toml
//! [client]
//! host = "${API_HOST}"
//! timeout = "30s"
//!
//! [debug]
//! log_requests = true
//!
//! [environments.production.client]
//! host = "https://api.example.com"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tern_query::{QueryError, QueryResult};
use url::Url;

/// Main configuration structure for `tern.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Connection settings.
    #[serde(default)]
    pub client: ConnectionConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl ClientConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::configuration(format!("cannot read {}: {}", path.display(), e)).with_source(e)
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded).map_err(|e| {
            QueryError::configuration(format!("invalid configuration: {}", e)).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the host is a URL and the timeout a duration.
    pub fn validate(&self) -> QueryResult<()> {
        self.host_url()?;
        self.timeout()?;
        Ok(())
    }

    /// The host as a URL.
    pub fn host_url(&self) -> QueryResult<Option<Url>> {
        let Some(host) = self.client.host.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(host).map_err(|e| {
            QueryError::configuration(format!("invalid host `{}`: {}", host, e))
                .with_suggestion("Use an absolute URL such as https://api.example.com")
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(QueryError::configuration(format!(
                "unsupported scheme `{}` in host `{}`",
                url.scheme(),
                host
            )));
        }
        Ok(Some(url))
    }

    /// The request timeout.
    pub fn timeout(&self) -> QueryResult<Option<Duration>> {
        self.client.timeout.as_deref().map(parse_duration).transpose()
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(client) = overrides.client {
                if let Some(host) = client.host {
                    self.client.host = Some(host);
                }
                if let Some(timeout) = client.timeout {
                    self.client.timeout = Some(timeout);
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_requests) = debug.log_requests {
                    self.debug.log_requests = log_requests;
                }
                if let Some(log_responses) = debug.log_responses {
                    self.debug.log_responses = log_responses;
                }
            }
        }
        self
    }
}

/// Connection settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Base URL (supports `${ENV_VAR}` interpolation).
    pub host: Option<String>,
    /// Request timeout such as `"500ms"`, `"30s"` or `"2m"`.
    pub timeout: Option<String>,
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every request body at debug level.
    #[serde(default)]
    pub log_requests: bool,
    /// Log every response body at debug level.
    #[serde(default)]
    pub log_responses: bool,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Connection overrides.
    pub client: Option<ConnectionOverride>,
    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Connection overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionOverride {
    /// Base URL override.
    pub host: Option<String>,
    /// Timeout override.
    pub timeout: Option<String>,
}

/// Debug overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Request logging override.
    pub log_requests: Option<bool>,
    /// Response logging override.
    pub log_responses: Option<bool>,
}

/// Parse `"<n>ms"`, `"<n>s"` or `"<n>m"`.
pub fn parse_duration(raw: &str) -> QueryResult<Duration> {
    let raw = raw.trim();
    let invalid = || {
        QueryError::configuration(format!("invalid duration `{}`", raw))
            .with_suggestion("Use a number followed by ms, s or m, e.g. \"30s\"")
    };
    let (digits, unit) = raw
        .find(|c: char| !c.is_ascii_digit())
        .map(|at| raw.split_at(at))
        .ok_or_else(invalid)?;
    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Replace `${VAR}` with the value of `VAR`; unknown variables are left as is.
fn expand_env_vars(content: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };
    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
