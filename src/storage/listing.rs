//! Directory listing
//!
//! Depth-one, name-sorted views of the request directory. A `Listing` reads
//! the filesystem each time it is iterated, so it can be walked again after
//! a mutation and will reflect the new state.

use log::{debug, error};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::error::MediaBrowserError;
use crate::storage::manager::PathManager;
use crate::storage::mime;
use crate::storage::results::{EntryKind, ListEntry, TypedFile};
use crate::storage::root::MediaRoot;

/// Lazy, restartable listing of one kind of entry.
#[derive(Debug, Clone)]
pub struct Listing {
    root: Arc<MediaRoot>,
    dir: PathBuf,
    kind: EntryKind,
}

impl Listing {
    /// Read the directory now and return its entries sorted by name.
    ///
    /// Entries whose target resolves outside the root (symlinks pointing
    /// away) or cannot be inspected are left out.
    pub fn iter(&self) -> Result<std::vec::IntoIter<ListEntry>, MediaBrowserError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            error!("Failed to list directory {}: {}", self.dir.display(), e);
            MediaBrowserError::NotFound("Unable to read the folder".into())
        })?;

        let mut listed = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();

            match fs::canonicalize(&path) {
                Ok(canonical) if self.root.contains(&canonical) => {}
                _ => {
                    debug!("Skipping {} (unresolvable or outside root)", path.display());
                    continue;
                }
            }

            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            if kind != self.kind {
                continue;
            }

            let modified = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|dur| dur.as_secs())
                .unwrap_or(0);

            listed.push(ListEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                kind,
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                modified,
            });
        }

        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed.into_iter())
    }
}

impl PathManager {
    /// Folders directly inside the request directory.
    pub fn folders(&self) -> Listing {
        self.listing(EntryKind::Directory)
    }

    /// Files directly inside the request directory.
    pub fn files(&self) -> Listing {
        self.listing(EntryKind::File)
    }

    /// Files directly inside the request directory, classified by content.
    pub fn files_with_type(&self) -> Result<Vec<TypedFile>, MediaBrowserError> {
        let files = self
            .files()
            .iter()?
            .map(|entry| {
                let mime = mime::sniff_file(&entry.path).unwrap_or_else(|e| {
                    debug!("Could not sniff {}: {}", entry.path.display(), e);
                    "application/octet-stream"
                });
                TypedFile {
                    is_image: mime::is_image(mime),
                    mime,
                    entry,
                }
            })
            .collect();
        Ok(files)
    }

    fn listing(&self, kind: EntryKind) -> Listing {
        Listing {
            root: Arc::clone(self.root()),
            dir: self.request_path().to_path_buf(),
            kind,
        }
    }
}
