//! Error types for each layer of the client.
//!
//! ERROR TAXONOMY
//! ==============
//! Transport failures and server-reported rejections surface as
//! [`ClientError`] and reach the user through a notification. Corrupt local
//! session data is a [`StorageError::Corrupt`] that the session store absorbs
//! at startup and never propagates to the shell.

use crate::state::collection::Phase;

/// Stable machine-readable code for each error variant.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// STORAGE
// =============================================================================

/// Failures reading or writing the durable credential pair.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored session is corrupt: {0}")]
    Corrupt(String),

    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORAGE_IO",
            Self::Corrupt(_) => "E_STORAGE_CORRUPT",
            Self::Encode(_) => "E_STORAGE_ENCODE",
        }
    }
}

// =============================================================================
// API CLIENT
// =============================================================================

/// Failures produced by the API gateway client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("cannot read {path}: {source}")]
    ReadFile { path: String, source: std::io::Error },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    /// Text suitable for a user notification: the server's own message when
    /// it sent one, otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_owned(),
        }
    }

    /// Whether this failure was reported by the server (as opposed to transport).
    #[must_use]
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl ErrorCode for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "E_TRANSPORT",
            Self::Server { .. } => "E_SERVER",
            Self::Decode(_) => "E_DECODE",
            Self::Storage(inner) => inner.error_code(),
            Self::ReadFile { .. } => "E_READ_FILE",
            Self::InvalidUrl { .. } => "E_INVALID_URL",
        }
    }
}

// =============================================================================
// FORM FIELDS
// =============================================================================

/// A field edit that could not be applied to a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{noun} has no editable field `{field}`")]
    Unknown { noun: &'static str, field: String },

    #[error("invalid value for `{field}`: {value:?} is not {expected}")]
    InvalidValue { field: &'static str, value: String, expected: &'static str },

    #[error("expected field=value, got {0:?}")]
    Malformed(String),
}

impl ErrorCode for FieldError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown { .. } => "E_FIELD_UNKNOWN",
            Self::InvalidValue { .. } => "E_FIELD_VALUE",
            Self::Malformed(_) => "E_FIELD_MALFORMED",
        }
    }
}

// =============================================================================
// LIST CONTROLLER
// =============================================================================

/// Failures of a list controller transition.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Another transition is still in flight.
    #[error("busy: {phase} in progress")]
    Busy { phase: Phase },

    /// The owning view was torn down.
    #[error("view is no longer mounted")]
    Unmounted,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ControllerError {
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Busy { phase } => format!("Please wait: {phase} in progress"),
            Self::Unmounted => fallback.to_owned(),
            Self::Client(inner) => inner.user_message(fallback),
        }
    }
}

impl ErrorCode for ControllerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "E_BUSY",
            Self::Unmounted => "E_UNMOUNTED",
            Self::Client(inner) => inner.error_code(),
        }
    }
}

// =============================================================================
// SHELL
// =============================================================================

/// Failures surfaced by the view shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{}", .0.join(" "))]
    Invalid(Vec<String>),

    #[error("not signed in; run `schooldesk login` first")]
    SignedOut,

    #[error("no {noun} with id {id}")]
    NotFound { noun: &'static str, id: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ShellError {
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Controller(inner) => inner.user_message(fallback),
            Self::Client(inner) => inner.user_message(fallback),
            Self::Storage(_) => fallback.to_owned(),
            Self::Invalid(_) | Self::SignedOut | Self::NotFound { .. } | Self::Field(_) => self.to_string(),
        }
    }
}

impl ErrorCode for ShellError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_INVALID",
            Self::SignedOut => "E_SIGNED_OUT",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Field(inner) => inner.error_code(),
            Self::Controller(inner) => inner.error_code(),
            Self::Client(inner) => inner.error_code(),
            Self::Storage(inner) => inner.error_code(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
