use std::path::PathBuf;

use casetpl_client::ConfigError;

/// Terminal front-end settings loaded from environment variables.
///
/// | Env Var              | Default |
/// |----------------------|---------|
/// | `CASETPL_LOG_JSON`   | `false` |
/// | `CASETPL_EXPORT_DIR` | `.`     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
    /// Directory export files are written to.
    pub export_dir: PathBuf,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_json = match lookup("CASETPL_LOG_JSON") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError {
                key: "CASETPL_LOG_JSON",
                message: format!("'{raw}' is not a boolean"),
            })?,
        };

        let export_dir = lookup("CASETPL_EXPORT_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            log_json,
            export_dir,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
