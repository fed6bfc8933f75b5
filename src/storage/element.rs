//! Element handle
//!
//! A resolved, containment-checked file or directory. Handles are never
//! cached across requests: they describe the filesystem at resolution time.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    path: PathBuf,
    is_dir: bool,
}

impl Element {
    pub(crate) fn new(path: PathBuf, is_dir: bool) -> Self {
        Self { path, is_dir }
    }

    /// Canonical absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Directory holding the element: the containing folder for a directory,
    /// the file's own directory for a file.
    pub fn containing_dir(&self) -> &Path {
        // Canonical paths carry no `..`, so the lexical parent is the real one.
        self.path.parent().unwrap_or(&self.path)
    }
}
