//! Root directory
//!
//! The fixed, canonical directory every operation is confined to, and the
//! containment predicate that guards all filesystem access.

use log::{debug, error};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::MediaBrowserError;

/// Immutable root of the media browser.
///
/// Built once at startup and shared between requests.
#[derive(Debug, Clone)]
pub struct MediaRoot {
    path: PathBuf,
    dir: String,
}

impl MediaRoot {
    /// Resolve `root_spec` against `base_dir` and verify it is a directory.
    pub fn open(root_spec: &str, base_dir: &Path) -> Result<Self, MediaBrowserError> {
        let dir = normalize_root_spec(root_spec);
        let candidate = join_relative(base_dir, &dir);

        let path = fs::canonicalize(&candidate).map_err(|e| {
            error!("Root {} (resolved: {}) is unusable: {}", dir, candidate.display(), e);
            MediaBrowserError::Config("Bad root path".into())
        })?;

        if !path.is_dir() {
            error!("Root {} is not a directory", path.display());
            return Err(MediaBrowserError::Config("Bad root path".into()));
        }

        debug!("Root {} resolved to {}", dir, path.display());
        Ok(Self { path, dir })
    }

    /// Canonical absolute path of the root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized root spec: no leading slash, trailing slash.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Containment check. `candidate` must already be canonical.
    pub fn contains(&self, candidate: &Path) -> bool {
        // Component-wise: "/data/media2" is not inside "/data/media".
        candidate.starts_with(&self.path)
    }

    /// Join `relative` onto `base` and canonicalize the result.
    ///
    /// Returns `None` when the target does not exist or escapes the root.
    pub fn resolve(&self, base: &Path, relative: &str) -> Option<PathBuf> {
        let canonical = fs::canonicalize(join_relative(base, relative)).ok()?;
        if self.contains(&canonical) {
            Some(canonical)
        } else {
            debug!(
                "Rejected {} (resolved to {} outside {})",
                relative,
                canonical.display(),
                self.path.display()
            );
            None
        }
    }

    /// Root-relative form of a directory, `/`-separated with a trailing `/`.
    /// `None` for the root itself or a path outside it.
    pub fn relative_dir(&self, path: &Path) -> Option<String> {
        if path == self.path {
            return None;
        }
        let relative = self.relative_file(path)?;
        Some(format!("{}/", relative))
    }

    /// Root-relative form of a file, `/`-separated without trailing `/`.
    pub fn relative_file(&self, path: &Path) -> Option<String> {
        let stripped = path.strip_prefix(&self.path).ok()?;
        let parts: Vec<String> = stripped
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

/// Normalize a root spec: backslashes become `/`, the leading `/` is dropped
/// and a trailing `/` is guaranteed.
pub fn normalize_root_spec(spec: &str) -> String {
    let spec = spec.replace('\\', "/");
    let spec = spec.strip_prefix('/').unwrap_or(&spec);
    if spec.ends_with('/') {
        spec.to_string()
    } else {
        format!("{}/", spec)
    }
}

/// Append a caller-supplied relative path to `base`.
///
/// Root and prefix components are dropped so the result never jumps to an
/// absolute location; `..` is kept and left to canonicalization.
pub(crate) fn join_relative(base: &Path, relative: &str) -> PathBuf {
    let relative = relative.replace('\\', "/");
    let mut joined = base.to_path_buf();
    for component in Path::new(&relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => joined.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    joined
}
