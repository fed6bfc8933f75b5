//! Error types
//!
//! Every core operation either succeeds or fails with exactly one
//! `MediaBrowserError`. The variant classifies the failure, the payload is the
//! human-readable message shown to the user.

use std::fmt;

/// Media browser operation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaBrowserError {
    /// Configured root is missing or not a directory, or config is unusable
    Config(String),
    /// Relative path escapes the root or does not exist
    InvalidPath(String),
    /// Target element not found
    NotFound(String),
    /// Name rejected by the filename policy
    InvalidName(String),
    /// Directory is not writable, or the upload move failed
    Write(String),
    /// Name collision on create/rename/upload
    Conflict(String),
    Create(String),
    Rename(String),
    Delete(String),
}

impl MediaBrowserError {
    /// The human-readable message, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            MediaBrowserError::Config(m)
            | MediaBrowserError::InvalidPath(m)
            | MediaBrowserError::NotFound(m)
            | MediaBrowserError::InvalidName(m)
            | MediaBrowserError::Write(m)
            | MediaBrowserError::Conflict(m)
            | MediaBrowserError::Create(m)
            | MediaBrowserError::Rename(m)
            | MediaBrowserError::Delete(m) => m,
        }
    }

    /// Short name of the failure kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaBrowserError::Config(_) => "config",
            MediaBrowserError::InvalidPath(_) => "invalid path",
            MediaBrowserError::NotFound(_) => "not found",
            MediaBrowserError::InvalidName(_) => "invalid name",
            MediaBrowserError::Write(_) => "write",
            MediaBrowserError::Conflict(_) => "conflict",
            MediaBrowserError::Create(_) => "create",
            MediaBrowserError::Rename(_) => "rename",
            MediaBrowserError::Delete(_) => "delete",
        }
    }
}

impl fmt::Display for MediaBrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaBrowserError::Config(m) => write!(f, "Configuration error: {}", m),
            MediaBrowserError::InvalidPath(m) => write!(f, "Invalid path: {}", m),
            MediaBrowserError::NotFound(m) => write!(f, "Not found: {}", m),
            MediaBrowserError::InvalidName(m) => write!(f, "Invalid name: {}", m),
            MediaBrowserError::Write(m) => write!(f, "Write error: {}", m),
            MediaBrowserError::Conflict(m) => write!(f, "Conflict: {}", m),
            MediaBrowserError::Create(m) => write!(f, "Create error: {}", m),
            MediaBrowserError::Rename(m) => write!(f, "Rename error: {}", m),
            MediaBrowserError::Delete(m) => write!(f, "Delete error: {}", m),
        }
    }
}

impl std::error::Error for MediaBrowserError {}

impl From<config::ConfigError> for MediaBrowserError {
    fn from(error: config::ConfigError) -> Self {
        MediaBrowserError::Config(error.to_string())
    }
}
