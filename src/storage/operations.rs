//! Storage operations
//!
//! Mutating operations on the request directory and on resolved elements:
//! upload, folder creation, rename and delete.

use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MediaBrowserError;
use crate::storage::element::Element;
use crate::storage::manager::PathManager;
use crate::storage::permissions::{is_writable, relax};
use crate::storage::results::DeleteReport;
use crate::storage::upload::UploadedFile;
use crate::storage::validation::{reject_dot_names, validate_file_name, validate_folder_name};

impl PathManager {
    /// Move an uploaded file into the request directory under its client name.
    ///
    /// The caller is expected to have run `check_upload_name` first; an
    /// existing file of the same name is replaced.
    pub fn upload(&self, file: UploadedFile) -> Result<PathBuf, MediaBrowserError> {
        let name = file.client_name();
        validate_file_name(name)?;
        reject_dot_names(name)?;

        let request_path = self.request_path();
        if !is_writable(request_path) {
            warn!("Upload refused, {} is not writable", request_path.display());
            return Err(MediaBrowserError::Write("The folder is not writable".into()));
        }

        let target = request_path.join(name);
        if let Err(e) = file.move_to(&target) {
            error!(
                "Failed to move upload {} to {}: {}",
                file.temp_path().display(),
                target.display(),
                e
            );
            return Err(MediaBrowserError::Write(format!(
                "Could not move the file \"{}\" to \"{}\" ({})",
                name,
                self.root().relative_file(&target).unwrap_or_default(),
                e
            )));
        }

        if let Err(e) = relax(&target) {
            debug!("Could not relax permissions on {}: {}", target.display(), e);
        }

        info!(
            "Uploaded {} ({} bytes) to {}",
            name,
            file.size(),
            target.display()
        );
        Ok(target)
    }

    /// Create `name` inside the request directory.
    ///
    /// Succeeds without doing anything when the name already resolves to an
    /// existing entry.
    pub fn create_folder(&self, name: &str) -> Result<(), MediaBrowserError> {
        validate_folder_name(name)?;
        reject_dot_names(name)?;

        let path = self.request_path().join(name);
        if fs::canonicalize(&path).is_ok() {
            debug!("Folder {} already exists", path.display());
            return Ok(());
        }

        if !is_writable(self.request_path()) {
            warn!(
                "Folder creation refused, {} is not writable",
                self.request_path().display()
            );
            return Err(MediaBrowserError::Write("The folder is not writable".into()));
        }

        if let Err(e) = create_dir(&path) {
            error!("Failed to create folder {}: {}", path.display(), e);
            return Err(MediaBrowserError::Create(
                "Error during the folder creation process".into(),
            ));
        }

        info!("Created folder {}", path.display());
        Ok(())
    }

    /// Rename `element` within its containing directory.
    pub fn rename(&self, element: &Element, new_name: &str) -> Result<PathBuf, MediaBrowserError> {
        if self.is_root_element(element) {
            return Err(MediaBrowserError::Rename(
                "Impossible to rename root path".into(),
            ));
        }
        validate_file_name(new_name)?;
        reject_dot_names(new_name)?;

        let new_path = element.containing_dir().join(new_name);
        if fs::symlink_metadata(&new_path).is_ok() {
            return Err(MediaBrowserError::Conflict(
                "The element already exists".into(),
            ));
        }

        if let Err(e) = fs::rename(element.path(), &new_path) {
            error!(
                "Failed to rename {} to {}: {}",
                element.path().display(),
                new_path.display(),
                e
            );
            return Err(MediaBrowserError::Rename(
                "Impossible to rename element".into(),
            ));
        }

        info!(
            "Renamed {} to {}",
            element.path().display(),
            new_path.display()
        );
        Ok(new_path)
    }

    /// Delete `element`; directories are removed with their whole content.
    pub fn delete(&self, element: &Element) -> Result<(), MediaBrowserError> {
        if self.is_root_element(element) {
            return Err(MediaBrowserError::Delete(
                "Impossible to delete root path".into(),
            ));
        }

        if !element.is_dir() {
            if let Err(e) = fs::remove_file(element.path()) {
                error!("Failed to delete file {}: {}", element.path().display(), e);
                return Err(MediaBrowserError::Delete(
                    "Impossible to delete element".into(),
                ));
            }
            info!("Deleted file {}", element.path().display());
            return Ok(());
        }

        let report = delete_recursive(element.path());
        for failure in &report.failures {
            warn!(
                "Could not delete {} while removing {}: {}",
                failure.path.display(),
                element.path().display(),
                failure.reason
            );
        }

        match fs::remove_dir(element.path()) {
            Ok(()) if report.is_clean() => {
                info!(
                    "Deleted folder {} ({} files, {} folders)",
                    element.path().display(),
                    report.files_removed,
                    report.folders_removed
                );
                Ok(())
            }
            Ok(()) => Err(MediaBrowserError::Delete(format!(
                "Impossible to delete element ({} entries left behind)",
                report.failures.len()
            ))),
            Err(e) => {
                error!("Failed to delete folder {}: {}", element.path().display(), e);
                Err(MediaBrowserError::Delete(
                    "Impossible to delete element".into(),
                ))
            }
        }
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().mode(0o777).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir(path)
}

/// Empty `dir`: every file first, then every folder deepest first.
///
/// Each step is best effort, failures are collected in the report. `dir`
/// itself is left for the caller. Symlinks are unlinked, never followed.
fn delete_recursive(dir: &Path) -> DeleteReport {
    let mut report = DeleteReport::default();
    let mut files = Vec::new();
    let mut folders = Vec::new();
    collect_tree(dir, &mut files, &mut folders, &mut report);

    for file in files {
        match fs::remove_file(&file) {
            Ok(()) => report.files_removed += 1,
            Err(e) => report.record_failure(file, &e),
        }
    }

    // Pre-order, so the reverse visits children before their parents.
    for folder in folders.into_iter().rev() {
        match fs::remove_dir(&folder) {
            Ok(()) => report.folders_removed += 1,
            Err(e) => report.record_failure(folder, &e),
        }
    }

    report
}

fn collect_tree(
    dir: &Path,
    files: &mut Vec<PathBuf>,
    folders: &mut Vec<PathBuf>,
    report: &mut DeleteReport,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.record_failure(dir.to_path_buf(), &e);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.record_failure(dir.to_path_buf(), &e);
                continue;
            }
        };
        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {
                folders.push(path.clone());
                collect_tree(&path, files, folders, report);
            }
            Ok(_) => files.push(path),
            Err(e) => report.record_failure(path, &e),
        }
    }
}
