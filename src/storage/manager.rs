//! Path manager
//!
//! Per-request context: the shared root plus the directory the request is
//! currently browsing. Build one per inbound request, never share it.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::MediaBrowserError;
use crate::storage::element::Element;
use crate::storage::root::MediaRoot;

/// The currently browsed directory.
#[derive(Debug, Clone)]
pub struct RequestLocation {
    path: PathBuf,
    dir: Option<String>,
    parent_dir: Option<String>,
    is_root: bool,
}

impl RequestLocation {
    fn root(root: &MediaRoot) -> Self {
        Self {
            path: root.path().to_path_buf(),
            dir: None,
            parent_dir: None,
            is_root: true,
        }
    }

    /// Canonical absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative form with trailing `/`, `None` at the root.
    pub fn dir(&self) -> Option<&str> {
        self.dir.as_deref()
    }

    /// Root-relative form of the parent, `None` when the parent is the root.
    pub fn parent_dir(&self) -> Option<&str> {
        self.parent_dir.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

/// Root confinement and filesystem mutation for one request.
#[derive(Debug, Clone)]
pub struct PathManager {
    root: Arc<MediaRoot>,
    location: RequestLocation,
}

impl PathManager {
    /// Start a request context at the root.
    pub fn new(root: Arc<MediaRoot>) -> Self {
        let location = RequestLocation::root(&root);
        Self { root, location }
    }

    /// Resolve the root spec against `base_dir` and start at the root.
    pub fn open(root_spec: &str, base_dir: &Path) -> Result<Self, MediaBrowserError> {
        Ok(Self::new(Arc::new(MediaRoot::open(root_spec, base_dir)?)))
    }

    /// Move the request context to `relative_dir`. Empty means the root.
    pub fn set_request_dir(&mut self, relative_dir: &str) -> Result<(), MediaBrowserError> {
        if relative_dir.is_empty() {
            self.location = RequestLocation::root(&self.root);
            return Ok(());
        }

        let Some(path) = self.root.resolve(self.root.path(), relative_dir) else {
            warn!("Rejected request directory {:?}", relative_dir);
            return Err(MediaBrowserError::InvalidPath("Bad path".into()));
        };

        if path == self.root.path() {
            self.location = RequestLocation::root(&self.root);
            return Ok(());
        }

        if !path.is_dir() {
            warn!("Request directory {:?} is not a directory", relative_dir);
            return Err(MediaBrowserError::InvalidPath("Bad path".into()));
        }

        let parent_dir = path
            .parent()
            .and_then(|parent| self.root.relative_dir(parent));

        debug!("Request directory set to {}", path.display());
        self.location = RequestLocation {
            dir: self.root.relative_dir(&path),
            parent_dir,
            path,
            is_root: false,
        };
        Ok(())
    }

    pub fn root(&self) -> &Arc<MediaRoot> {
        &self.root
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Root spec relative to the base directory (no leading, with trailing `/`).
    pub fn root_dir(&self) -> &str {
        self.root.dir()
    }

    pub fn location(&self) -> &RequestLocation {
        &self.location
    }

    pub fn request_path(&self) -> &Path {
        self.location.path()
    }

    pub fn request_dir(&self) -> Option<&str> {
        self.location.dir()
    }

    pub fn parent_dir(&self) -> Option<&str> {
        self.location.parent_dir()
    }

    pub fn is_root(&self) -> bool {
        self.location.is_root()
    }

    /// True when `name` exists and resolves inside the root.
    ///
    /// `full_path` resolves against the root, otherwise against the request
    /// directory. Never fails: out-of-bounds candidates are simply absent.
    pub fn element_exists(&self, name: &str, full_path: bool) -> bool {
        let base = if full_path {
            self.root.path()
        } else {
            self.location.path()
        };
        self.root
            .resolve(base, name)
            .is_some_and(|path| path.exists())
    }

    /// Resolve a root-relative path to an element handle.
    pub fn get_element(&self, path: &str) -> Result<Element, MediaBrowserError> {
        let resolved = self
            .root
            .resolve(self.root.path(), path)
            .ok_or_else(|| MediaBrowserError::NotFound("Element does not exist".into()))?;

        let metadata = fs::metadata(&resolved)
            .map_err(|_| MediaBrowserError::NotFound("Element does not exist".into()))?;

        Ok(Element::new(resolved, metadata.is_dir()))
    }

    /// Root-relative form of a directory path (`None` for the root).
    pub fn relative_dir(&self, path: &Path) -> Option<String> {
        self.root.relative_dir(path)
    }

    /// Public URL path of an element: root spec followed by its relative path.
    pub fn url_element(&self, element: &Element) -> String {
        self.url_path(element.path())
    }

    /// Public URL path of any path under the root.
    pub fn url_path(&self, path: &Path) -> String {
        let relative = self.root.relative_file(path).unwrap_or_default();
        format!("{}{}", self.root.dir(), relative)
    }

    /// True when `element` is the root directory itself.
    pub fn is_root_element(&self, element: &Element) -> bool {
        element.path() == self.root.path()
    }
}
