//! Uploaded files
//!
//! A transient upload: the client-supplied filename plus the staged bytes
//! waiting to be moved into the request directory.

use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct UploadedFile {
    client_name: String,
    temp_path: PathBuf,
    size: u64,
}

impl UploadedFile {
    /// Write `content` to a fresh file under `staging_dir`.
    pub fn stage(staging_dir: &Path, client_name: &str, content: &[u8]) -> io::Result<Self> {
        let sequence = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = staging_dir.join(format!(
            "media-browser-{}-{}.upload",
            std::process::id(),
            sequence
        ));

        write_new(&temp_path, content)?;

        debug!(
            "Staged {} bytes for {} at {}",
            content.len(),
            client_name,
            temp_path.display()
        );

        Ok(Self {
            client_name: client_name.to_string(),
            temp_path,
            size: content.len() as u64,
        })
    }

    /// Filename as sent by the client.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Move the staged bytes to `target`.
    ///
    /// A plain rename first. When that fails (typically a staging dir on
    /// another device) the bytes are copied into a fresh sibling of `target`
    /// and that sibling is renamed into place, so `target` is either fully
    /// written or untouched and an existing link at `target` is replaced,
    /// never written through.
    pub fn move_to(&self, target: &Path) -> io::Result<()> {
        match fs::rename(&self.temp_path, target) {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(
                    "Rename {} -> {} failed ({}), copying instead",
                    self.temp_path.display(),
                    target.display(),
                    e
                );
                self.copy_into_place(target)?;
                if let Err(e) = fs::remove_file(&self.temp_path) {
                    warn!("Could not remove staged upload {}: {}", self.temp_path.display(), e);
                }
                Ok(())
            }
        }
    }

    fn copy_into_place(&self, target: &Path) -> io::Result<()> {
        let dir = target.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "upload target has no parent")
        })?;
        let sequence = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let sibling = dir.join(format!(
            ".media-browser-{}-{}.part",
            std::process::id(),
            sequence
        ));

        let copied = (|| -> io::Result<()> {
            let mut output = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&sibling)?;
            let mut input = File::open(&self.temp_path)?;
            io::copy(&mut input, &mut output)?;
            output.sync_all()?;
            fs::rename(&sibling, target)
        })();

        if copied.is_err() {
            let _ = fs::remove_file(&sibling);
        }
        copied
    }
}

/// Create `path` exclusively (never through an existing file or link) and
/// fill it with `content`. A partial write is removed again.
fn write_new(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = file.write_all(content).and_then(|_| file.sync_all());
    if written.is_err() {
        drop(file);
        let _ = fs::remove_file(path);
    }
    written
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        // Already gone after a successful move.
        let _ = fs::remove_file(&self.temp_path);
    }
}
