use std::fs;
use std::path::Path;

use media_browser::MediaBrowserError;
use media_browser::storage::{EntryKind, PathManager, UploadedFile};
use tempfile::TempDir;

/// Base dir holding a `media` root plus a few entries outside of it.
fn setup() -> (TempDir, PathManager) {
    let base = TempDir::new().unwrap();
    fs::create_dir_all(base.path().join("media")).unwrap();
    fs::create_dir_all(base.path().join("media2")).unwrap();
    fs::write(base.path().join("secret.txt"), b"top secret").unwrap();
    fs::write(base.path().join("media2").join("other.txt"), b"other").unwrap();
    let manager = PathManager::open("/media", base.path()).unwrap();
    (base, manager)
}

fn names(manager: &PathManager, kind: EntryKind) -> Vec<String> {
    let listing = match kind {
        EntryKind::Directory => manager.folders(),
        EntryKind::File => manager.files(),
    };
    listing.iter().unwrap().map(|entry| entry.name).collect()
}

#[test]
fn open_normalizes_root_spec() {
    let (base, manager) = setup();
    assert_eq!(manager.root_dir(), "media/");
    assert_eq!(
        manager.root_path(),
        fs::canonicalize(base.path().join("media")).unwrap()
    );
    assert!(manager.is_root());
    assert_eq!(manager.request_dir(), None);
    assert_eq!(manager.request_path(), manager.root_path());
}

#[test]
fn open_rejects_missing_or_file_root() {
    let (base, _manager) = setup();
    assert!(matches!(
        PathManager::open("missing", base.path()),
        Err(MediaBrowserError::Config(_))
    ));
    assert!(matches!(
        PathManager::open("secret.txt", base.path()),
        Err(MediaBrowserError::Config(_))
    ));
}

#[test]
fn empty_request_dir_is_root() {
    let (_base, mut manager) = setup();
    manager.set_request_dir("").unwrap();
    assert!(manager.is_root());
    assert_eq!(manager.parent_dir(), None);
}

#[test]
fn traversal_outside_root_is_rejected() {
    let (_base, mut manager) = setup();
    fs::create_dir_all(manager.root_path().join("a")).unwrap();

    for attempt in ["..", "../", "a/../..", "a/../../media2", "../media2", "/../..", "..\\media2"] {
        assert_eq!(
            manager.set_request_dir(attempt),
            Err(MediaBrowserError::InvalidPath("Bad path".into())),
            "{attempt} should be rejected"
        );
    }
    assert!(manager.is_root());
}

#[test]
fn dot_dot_back_to_root_is_root() {
    let (_base, mut manager) = setup();
    fs::create_dir_all(manager.root_path().join("a")).unwrap();
    manager.set_request_dir("a/..").unwrap();
    assert!(manager.is_root());
    assert_eq!(manager.request_dir(), None);
}

#[test]
fn missing_or_non_directory_request_dir_is_rejected() {
    let (_base, mut manager) = setup();
    fs::write(manager.root_path().join("file.txt"), b"x").unwrap();

    assert!(matches!(
        manager.set_request_dir("nope"),
        Err(MediaBrowserError::InvalidPath(_))
    ));
    assert!(matches!(
        manager.set_request_dir("file.txt"),
        Err(MediaBrowserError::InvalidPath(_))
    ));
}

#[test]
fn sub_directories_are_normalized() {
    let (_base, mut manager) = setup();
    fs::create_dir_all(manager.root_path().join("a").join("b")).unwrap();

    manager.set_request_dir("a/b").unwrap();
    assert!(!manager.is_root());
    assert_eq!(manager.request_dir(), Some("a/b/"));
    assert_eq!(manager.parent_dir(), Some("a/"));
    assert_eq!(manager.request_path(), manager.root_path().join("a").join("b"));

    manager.set_request_dir("/a/").unwrap();
    assert_eq!(manager.request_dir(), Some("a/"));
    assert_eq!(manager.parent_dir(), None);

    manager.set_request_dir("a/./b/../b/").unwrap();
    assert_eq!(manager.request_dir(), Some("a/b/"));
}

#[test]
fn element_exists_is_confined_to_root() {
    let (_base, mut manager) = setup();
    fs::create_dir_all(manager.root_path().join("a")).unwrap();
    fs::write(manager.root_path().join("a").join("pic.png"), b"x").unwrap();

    assert!(!manager.element_exists("../secret.txt", false));
    assert!(!manager.element_exists("../secret.txt", true));
    assert!(!manager.element_exists("../media2/other.txt", true));
    assert!(!manager.element_exists("missing.txt", true));
    assert!(manager.element_exists("a/pic.png", true));
    assert!(manager.element_exists("/a/pic.png", true));

    manager.set_request_dir("a").unwrap();
    assert!(manager.element_exists("pic.png", false));
    assert!(!manager.element_exists("pic.png", true));
    assert!(!manager.element_exists("../../secret.txt", false));
}

#[test]
fn get_element_outside_root_is_not_found() {
    let (_base, manager) = setup();
    assert_eq!(
        manager.get_element("../secret.txt"),
        Err(MediaBrowserError::NotFound("Element does not exist".into()))
    );
}

#[test]
fn create_then_delete_folder() {
    let (_base, manager) = setup();

    manager.create_folder("abc").unwrap();
    assert!(manager.element_exists("abc", false));

    let element = manager.get_element("abc").unwrap();
    assert!(element.is_dir());
    manager.delete(&element).unwrap();
    assert!(!manager.element_exists("abc", false));
}

#[test]
fn create_existing_folder_is_a_no_op() {
    let (_base, manager) = setup();
    manager.create_folder("abc").unwrap();
    fs::write(manager.root_path().join("abc").join("keep.txt"), b"x").unwrap();

    manager.create_folder("abc").unwrap();
    assert!(manager.element_exists("abc/keep.txt", true));
    assert_eq!(
        manager.check_folder_name("abc"),
        Err(MediaBrowserError::Conflict("The folder already exists".into()))
    );
}

#[test]
fn invalid_names_never_touch_the_filesystem() {
    let (base, manager) = setup();
    fs::write(manager.root_path().join("a.txt"), b"a").unwrap();
    let element = manager.get_element("a.txt").unwrap();

    for name in ["a b", "../escape", "x/y", "", "caf\u{e9}"] {
        assert!(matches!(
            manager.create_folder(name),
            Err(MediaBrowserError::InvalidName(_))
        ));
        assert!(matches!(
            manager.rename(&element, name),
            Err(MediaBrowserError::InvalidName(_))
        ));
    }
    assert!(matches!(
        manager.create_folder("abcdefghijklmnopqrstu"),
        Err(MediaBrowserError::InvalidName(_))
    ));

    let staging = TempDir::new().unwrap();
    let file = UploadedFile::stage(staging.path(), "../escape.txt", b"x").unwrap();
    assert!(matches!(
        manager.upload(file),
        Err(MediaBrowserError::InvalidName(_))
    ));

    assert_eq!(names(&manager, EntryKind::Directory), Vec::<String>::new());
    assert_eq!(names(&manager, EntryKind::File), vec!["a.txt".to_string()]);
    assert!(!base.path().join("escape").exists());
    assert!(!base.path().join("escape.txt").exists());
}

#[test]
fn rename_onto_existing_name_conflicts() {
    let (_base, manager) = setup();
    fs::write(manager.root_path().join("a.txt"), b"first").unwrap();
    fs::write(manager.root_path().join("b.txt"), b"second").unwrap();

    let element = manager.get_element("a.txt").unwrap();
    assert_eq!(
        manager.rename(&element, "b.txt"),
        Err(MediaBrowserError::Conflict("The element already exists".into()))
    );
    assert_eq!(fs::read(manager.root_path().join("a.txt")).unwrap(), b"first");
    assert_eq!(fs::read(manager.root_path().join("b.txt")).unwrap(), b"second");
}

#[test]
fn rename_file_and_directory_stay_in_place() {
    let (_base, manager) = setup();
    fs::create_dir_all(manager.root_path().join("a").join("inner")).unwrap();
    fs::write(manager.root_path().join("a").join("old.txt"), b"x").unwrap();

    let file = manager.get_element("a/old.txt").unwrap();
    let renamed = manager.rename(&file, "new.txt").unwrap();
    assert_eq!(renamed, manager.root_path().join("a").join("new.txt"));

    let dir = manager.get_element("a/inner").unwrap();
    manager.rename(&dir, "outer").unwrap();
    assert!(manager.element_exists("a/outer", true));
    assert!(!manager.element_exists("a/inner", true));
}

#[test]
fn delete_removes_whole_tree() {
    let (_base, mut manager) = setup();
    let root = manager.root_path().to_path_buf();
    fs::create_dir_all(root.join("parent").join("tree").join("x").join("y")).unwrap();
    fs::create_dir_all(root.join("parent").join("tree").join("z")).unwrap();
    fs::write(root.join("parent").join("tree").join("a.txt"), b"a").unwrap();
    fs::write(root.join("parent").join("tree").join("x").join("b.txt"), b"b").unwrap();
    fs::write(root.join("parent").join("tree").join("x").join("y").join("c.txt"), b"c").unwrap();
    fs::create_dir_all(root.join("parent").join("sibling")).unwrap();

    let element = manager.get_element("parent/tree").unwrap();
    manager.delete(&element).unwrap();

    manager.set_request_dir("parent").unwrap();
    assert_eq!(names(&manager, EntryKind::Directory), vec!["sibling".to_string()]);
    assert!(!root.join("parent").join("tree").exists());
}

#[test]
fn delete_single_file() {
    let (_base, manager) = setup();
    fs::write(manager.root_path().join("gone.txt"), b"x").unwrap();
    let element = manager.get_element("gone.txt").unwrap();
    manager.delete(&element).unwrap();
    assert!(!manager.element_exists("gone.txt", true));
}

#[test]
fn root_cannot_be_renamed_or_deleted() {
    let (_base, manager) = setup();
    fs::write(manager.root_path().join("keep.txt"), b"x").unwrap();

    for path in ["", "/", "./", "."] {
        let root = manager.get_element(path).unwrap();
        assert!(manager.is_root_element(&root));
        assert_eq!(
            manager.delete(&root),
            Err(MediaBrowserError::Delete("Impossible to delete root path".into()))
        );
        assert_eq!(
            manager.rename(&root, "other"),
            Err(MediaBrowserError::Rename("Impossible to rename root path".into()))
        );
    }
    assert!(manager.root_path().join("keep.txt").exists());
}

#[test]
fn invoices_scenario() {
    let (_base, mut manager) = setup();
    manager.set_request_dir("").unwrap();
    assert!(manager.is_root());

    manager.create_folder("Invoices").unwrap();
    assert!(manager.element_exists("Invoices", false));

    manager.set_request_dir("Invoices").unwrap();
    assert_eq!(manager.request_dir(), Some("Invoices/"));
    assert_eq!(manager.parent_dir(), None);

    manager.set_request_dir("").unwrap();
    let element = manager.get_element("Invoices").unwrap();
    assert_eq!(element.path(), manager.root_path().join("Invoices"));
    assert_eq!(element.containing_dir(), manager.root_path());

    let renamed = manager.rename(&element, "Invoices2").unwrap();
    assert_eq!(renamed, manager.root_path().join("Invoices2"));
    assert!(manager.element_exists("Invoices2", false));
    assert!(!manager.element_exists("Invoices", false));
}

#[test]
fn upload_moves_into_request_dir() {
    let (_base, mut manager) = setup();
    fs::create_dir_all(manager.root_path().join("docs")).unwrap();
    manager.set_request_dir("docs").unwrap();

    manager.check_upload_name("report.pdf").unwrap();
    let staging = TempDir::new().unwrap();
    let file = UploadedFile::stage(staging.path(), "report.pdf", b"%PDF-1.4 body").unwrap();
    let staged_at = file.temp_path().to_path_buf();

    let target = manager.upload(file).unwrap();
    assert_eq!(target, manager.request_path().join("report.pdf"));
    assert_eq!(fs::read(&target).unwrap(), b"%PDF-1.4 body");
    assert!(!staged_at.exists());

    assert_eq!(
        manager.check_upload_name("report.pdf"),
        Err(MediaBrowserError::Conflict("The file already exists".into()))
    );
    assert!(matches!(
        manager.check_upload_name("bad name.pdf"),
        Err(MediaBrowserError::InvalidName(_))
    ));
}

#[test]
fn listing_is_sorted_split_and_restartable() {
    let (_base, manager) = setup();
    let root = manager.root_path().to_path_buf();
    fs::create_dir_all(root.join("zeta")).unwrap();
    fs::create_dir_all(root.join("alpha")).unwrap();
    fs::create_dir_all(root.join("alpha").join("nested")).unwrap();
    fs::write(root.join("b.txt"), b"hello").unwrap();
    fs::write(root.join("a.png"), [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]).unwrap();

    let folders = manager.folders();
    let first: Vec<String> = folders.iter().unwrap().map(|e| e.name).collect();
    assert_eq!(first, vec!["alpha".to_string(), "zeta".to_string()]);

    fs::create_dir_all(root.join("middle")).unwrap();
    let second: Vec<String> = folders.iter().unwrap().map(|e| e.name).collect();
    assert_eq!(second, vec!["alpha".to_string(), "middle".to_string(), "zeta".to_string()]);

    let files = manager.files_with_type().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].entry.name, "a.png");
    assert!(files[0].is_image);
    assert_eq!(files[0].mime, "image/png");
    assert_eq!(files[1].entry.name, "b.txt");
    assert!(!files[1].is_image);
    assert_eq!(files[1].entry.size, 5);
    assert_eq!(files[1].entry.kind, EntryKind::File);
}

#[test]
fn url_of_element() {
    let (_base, manager) = setup();
    fs::create_dir_all(manager.root_path().join("img")).unwrap();
    fs::write(manager.root_path().join("img").join("logo.png"), b"x").unwrap();

    let element = manager.get_element("img/logo.png").unwrap();
    assert_eq!(manager.url_element(&element), "media/img/logo.png");
    assert_eq!(manager.relative_dir(element.containing_dir()), Some("img/".to_string()));
    assert_eq!(manager.relative_dir(manager.root_path()), None);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::{PermissionsExt, symlink};

    fn set_mode(path: &Path, mode: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Permission bits do not bind a superuser.
    fn running_as_root() -> bool {
        nix::unistd::geteuid().is_root()
    }

    /// Staging area on a different device than the root when one is available.
    fn foreign_staging() -> TempDir {
        let shm = Path::new("/dev/shm");
        if shm.is_dir() {
            if let Ok(dir) = TempDir::new_in(shm) {
                return dir;
            }
        }
        TempDir::new().unwrap()
    }

    #[test]
    fn symlink_escaping_root_is_rejected() {
        let (base, mut manager) = setup();
        symlink(base.path().join("media2"), manager.root_path().join("escape")).unwrap();
        symlink(base.path().join("secret.txt"), manager.root_path().join("secret")).unwrap();

        assert!(matches!(
            manager.set_request_dir("escape"),
            Err(MediaBrowserError::InvalidPath(_))
        ));
        assert!(!manager.element_exists("escape", false));
        assert!(!manager.element_exists("escape/other.txt", true));
        assert!(!manager.element_exists("secret", true));
        assert!(matches!(
            manager.get_element("secret"),
            Err(MediaBrowserError::NotFound(_))
        ));

        assert!(names(&manager, EntryKind::Directory).is_empty());
        assert!(names(&manager, EntryKind::File).is_empty());
    }

    #[test]
    fn symlink_inside_root_is_followed() {
        let (_base, mut manager) = setup();
        fs::create_dir_all(manager.root_path().join("real")).unwrap();
        symlink(manager.root_path().join("real"), manager.root_path().join("alias")).unwrap();

        manager.set_request_dir("alias").unwrap();
        assert_eq!(manager.request_dir(), Some("real/"));
    }

    #[test]
    fn read_only_directory_refuses_writes() {
        if running_as_root() {
            return;
        }
        let (_base, mut manager) = setup();
        let locked = manager.root_path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        set_mode(&locked, 0o555);

        manager.set_request_dir("locked").unwrap();
        assert_eq!(
            manager.create_folder("new"),
            Err(MediaBrowserError::Write("The folder is not writable".into()))
        );

        let staging = TempDir::new().unwrap();
        let file = UploadedFile::stage(staging.path(), "file.txt", b"x").unwrap();
        assert_eq!(
            manager.upload(file),
            Err(MediaBrowserError::Write("The folder is not writable".into()))
        );

        set_mode(&locked, 0o755);
        assert!(!locked.join("new").exists());
        assert!(!locked.join("file.txt").exists());
    }

    #[test]
    fn upload_replaces_dangling_link_instead_of_writing_through() {
        let (base, manager) = setup();
        let outside = base.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        let link = manager.root_path().join("evil.txt");
        symlink(outside.join("pwned.txt"), &link).unwrap();

        manager.check_upload_name("evil.txt").unwrap();
        let staging = foreign_staging();
        let file = UploadedFile::stage(staging.path(), "evil.txt", b"escaped").unwrap();
        manager.upload(file).unwrap();

        assert!(!outside.join("pwned.txt").exists());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_file());
        assert_eq!(fs::read(&link).unwrap(), b"escaped");
        let leftovers: Vec<_> = fs::read_dir(manager.root_path())
            .unwrap()
            .flatten()
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("evil.txt")]);
    }

    #[test]
    fn delete_continues_past_locked_folder_then_fails() {
        if running_as_root() {
            return;
        }
        let (_base, manager) = setup();
        let tree = manager.root_path().join("tree");
        let locked = tree.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::create_dir_all(tree.join("open")).unwrap();
        fs::write(tree.join("a.txt"), b"a").unwrap();
        fs::write(tree.join("open").join("b.txt"), b"b").unwrap();
        fs::write(locked.join("f.txt"), b"f").unwrap();
        set_mode(&locked, 0o555);

        let element = manager.get_element("tree").unwrap();
        let result = manager.delete(&element);
        set_mode(&locked, 0o755);

        assert!(matches!(result, Err(MediaBrowserError::Delete(_))));
        assert!(!tree.join("a.txt").exists());
        assert!(!tree.join("open").exists());
        assert!(locked.join("f.txt").exists());
    }

    #[test]
    fn uploaded_file_permissions_are_relaxed() {
        let (_base, manager) = setup();
        let staging = TempDir::new().unwrap();
        let file = UploadedFile::stage(staging.path(), "open.txt", b"x").unwrap();
        set_mode(file.temp_path(), 0o600);

        let target = manager.upload(file).unwrap();
        let mode = fs::metadata(target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o666);
    }
}
