//! File permissions
//!
//! Write checks on directories and permission relaxing on new uploads.

use std::fs;
use std::io;
use std::path::Path;

/// Check if the current process may create entries in a directory
#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};

    path.is_dir() && access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_dir() && !metadata.permissions().readonly(),
        Err(_) => false,
    }
}

/// Open up a freshly uploaded file for later read/rename/delete
#[cfg(unix)]
pub fn relax(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
pub fn relax(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn own_directory_is_writable() {
        let dir = TempDir::new().unwrap();
        assert!(is_writable(dir.path()));
    }

    #[test]
    fn missing_or_file_is_not_writable() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        assert!(!is_writable(&file));
        assert!(!is_writable(&dir.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn follows_process_access_not_mode_bits() {
        use nix::unistd::geteuid;
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        // access(2) lets a superuser write regardless of the mode bits.
        assert_eq!(is_writable(dir.path()), geteuid().is_root());
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
    }
}
