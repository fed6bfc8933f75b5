//! Name validation
//!
//! Filename policy for every name a caller supplies (upload filename, new
//! folder name, rename target), plus the pre-flight checks run before an
//! upload or folder creation.

use std::fs;

use crate::error::MediaBrowserError;
use crate::storage::manager::PathManager;

/// Longest accepted folder name
pub const MAX_FOLDER_NAME_LENGTH: usize = 20;

/// `^[A-Za-z0-9._-]+$`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Validate an upload filename or rename target.
pub fn validate_file_name(name: &str) -> Result<(), MediaBrowserError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(MediaBrowserError::InvalidName("Incorrect filename".into()))
    }
}

/// Validate a new folder name.
pub fn validate_folder_name(name: &str) -> Result<(), MediaBrowserError> {
    if name.is_empty() {
        return Err(MediaBrowserError::InvalidName(
            "The folder name cannot be blank".into(),
        ));
    }
    if name.len() > MAX_FOLDER_NAME_LENGTH {
        return Err(MediaBrowserError::InvalidName(format!(
            "The folder name is too long ({} characters max)",
            MAX_FOLDER_NAME_LENGTH
        )));
    }
    if !is_valid_name(name) {
        return Err(MediaBrowserError::InvalidName("Incorrect folder name".into()));
    }
    Ok(())
}

/// `.` and `..` pass the character policy but never name a new entry.
pub(crate) fn reject_dot_names(name: &str) -> Result<(), MediaBrowserError> {
    if name == "." || name == ".." {
        return Err(MediaBrowserError::InvalidName(format!(
            "\"{}\" is not a valid name",
            name
        )));
    }
    Ok(())
}

impl PathManager {
    /// Pre-flight for an upload into the request directory.
    pub fn check_upload_name(&self, name: &str) -> Result<(), MediaBrowserError> {
        validate_file_name(name)?;
        if fs::canonicalize(self.request_path().join(name)).is_ok() {
            return Err(MediaBrowserError::Conflict("The file already exists".into()));
        }
        Ok(())
    }

    /// Pre-flight for a new folder in the request directory.
    pub fn check_folder_name(&self, name: &str) -> Result<(), MediaBrowserError> {
        validate_folder_name(name)?;
        if fs::canonicalize(self.request_path().join(name)).is_ok() {
            return Err(MediaBrowserError::Conflict(
                "The folder already exists".into(),
            ));
        }
        Ok(())
    }
}
