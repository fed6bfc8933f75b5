//! Module `commands`
//!
//! Data structures for parsed commands and their results.

/// A command received from a client.
///
/// Directory arguments are root-relative; `/` stands for the root itself.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// List folders and files of a directory
    SHOW(String),
    /// Upload `size` raw bytes following the command line
    UPLOAD {
        dir: String,
        filename: String,
        size: u64,
    },
    /// Create a folder inside a directory
    MKDIR { dir: String, name: String },
    /// Rename an element (root-relative path)
    RENAME { element: String, new_name: String },
    /// Delete an element (root-relative path)
    DELETE(String),
    QUIT,
    UNKNOWN,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: String) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message),
        }
    }

    pub fn failure(reason: impl Into<String>, message: String) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            message: Some(message),
        }
    }
}
