/// Template API client configuration loaded from environment variables.
///
/// | Env Var                | Default                  |
/// |------------------------|--------------------------|
/// | `CASETPL_BASE_URL`     | `http://localhost:9000`  |
/// | `CASETPL_API_KEY`      | unset (no auth header)   |
/// | `CASETPL_TIMEOUT_SECS` | `30`                     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the server, without a trailing slash.
    pub base_url: String,
    /// Sent as a bearer token when set.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration value for {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("CASETPL_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError {
                key: "CASETPL_BASE_URL",
                message: format!("'{base_url}' is not an http(s) URL"),
            });
        }

        let api_key = lookup("CASETPL_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let timeout_secs = match lookup("CASETPL_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                key: "CASETPL_TIMEOUT_SECS",
                message: format!("'{raw}' is not a valid number of seconds"),
            })?,
        };

        Ok(Self {
            base_url,
            api_key,
            timeout_secs,
        })
    }
}
