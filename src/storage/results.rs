//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of the request directory
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Size in bytes, 0 for directories
    pub size: u64,
    /// Seconds since the Unix epoch, 0 when unknown
    pub modified: u64,
}

/// A listed file classified by its content
#[derive(Debug, Clone)]
pub struct TypedFile {
    pub entry: ListEntry,
    pub mime: &'static str,
    pub is_image: bool,
}

/// An inner entry a recursive delete could not remove
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of the inner steps of a recursive delete
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    pub files_removed: usize,
    pub folders_removed: usize,
    pub failures: Vec<DeleteFailure>,
}

impl DeleteReport {
    pub fn record_failure(&mut self, path: PathBuf, error: &std::io::Error) {
        self.failures.push(DeleteFailure {
            path,
            reason: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
