//! Client configuration parsed from environment variables.
//!
//! Precedence is CLI flag > environment > default. The CLI layer applies its
//! overrides on top of the value returned by [`ClientConfig::from_env`].

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_FILE_NAME: &str = "session.json";
pub const FALLBACK_SESSION_FILE: &str = ".schooldesk-session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Where the credential pair is persisted between runs.
    pub session_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SCHOOLDESK_BASE_URL`: default `http://localhost:5000`
    /// - `SCHOOLDESK_SESSION_FILE`: default `<data dir>/schooldesk/session.json`
    /// - `SCHOOLDESK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SCHOOLDESK_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SCHOOLDESK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let session_file = lookup("SCHOOLDESK_SESSION_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(default_session_file, PathBuf::from);
        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "SCHOOLDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_secs(&lookup, "SCHOOLDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Self { base_url: normalize_base_url(&base_url), session_file, timeouts }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = path;
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

/// Positive whole seconds from `key`. Zero and unparsable values fall back to
/// `default` with a warning.
fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            tracing::warn!(key, value = %raw, default, "invalid timeout, using default");
            default
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(FALLBACK_SESSION_FILE),
        |dir| dir.join("schooldesk").join(SESSION_FILE_NAME),
    )
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
