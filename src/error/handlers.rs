//! Error handlers
//!
//! Maps media browser errors onto response codes for the line protocol.

use crate::error::types::MediaBrowserError;
use log::{error, warn};

/// Log a failed operation. Only configuration failures are treated as fatal.
pub fn handle_error(err: &MediaBrowserError) {
    match err {
        MediaBrowserError::Config(_) => error!("Media browser error: {}", err),
        _ => warn!("Media browser operation failed ({}): {}", err.kind(), err),
    }
}

/// Convert error to response code
pub fn error_to_status(err: &MediaBrowserError) -> u16 {
    match err {
        MediaBrowserError::Config(_) => 421,
        MediaBrowserError::InvalidPath(_) => 404,
        MediaBrowserError::NotFound(_) => 404,
        MediaBrowserError::InvalidName(_) => 501,
        MediaBrowserError::Write(_) => 553,
        MediaBrowserError::Conflict(_) => 550,
        MediaBrowserError::Create(_) => 550,
        MediaBrowserError::Rename(_) => 550,
        MediaBrowserError::Delete(_) => 550,
    }
}
