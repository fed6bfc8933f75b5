//! Command handlers
//!
//! Controller logic sitting between the line protocol and the storage core:
//! each command gets a fresh `PathManager`, names are checked at the boundary
//! and every typed failure is turned into a response line.

use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::MediaBrowserError;
use crate::error::handlers::{error_to_status, handle_error};
use crate::protocol::responses::{
    BAD_VALUE, ELEMENT_UPDATED, FOLDER_CREATED, GOODBYE, LISTING, UNKNOWN_COMMAND, UPLOADED,
    display_dir, format_continuation, format_response,
};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::storage::{Element, MediaRoot, PathManager, UploadedFile, is_valid_name};

/// Shared, immutable state every command is handled against.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub root: Arc<MediaRoot>,
    pub staging_dir: PathBuf,
}

impl HandlerContext {
    pub fn new(root: Arc<MediaRoot>, staging_dir: PathBuf) -> Self {
        Self { root, staging_dir }
    }

    /// A fresh request context positioned at `dir`.
    fn manager(&self, dir: &str) -> Result<PathManager, MediaBrowserError> {
        let mut manager = PathManager::new(Arc::clone(&self.root));
        manager.set_request_dir(dir)?;
        Ok(manager)
    }
}

/// Dispatches a command to its handler.
///
/// `payload` carries the raw bytes of an `UPLOAD`.
pub fn handle_command(
    context: &HandlerContext,
    command: &Command,
    payload: Option<&[u8]>,
) -> CommandResult {
    match command {
        Command::SHOW(dir) => handle_cmd_show(context, dir),
        Command::UPLOAD { dir, filename, .. } => {
            handle_cmd_upload(context, dir, filename, payload.unwrap_or_default())
        }
        Command::MKDIR { dir, name } => handle_cmd_mkdir(context, dir, name),
        Command::RENAME { element, new_name } => handle_cmd_rename(context, element, new_name),
        Command::DELETE(element) => handle_cmd_delete(context, element),
        Command::QUIT => CommandResult {
            status: CommandStatus::CloseConnection,
            message: Some(format_response(GOODBYE, "Goodbye")),
        },
        Command::UNKNOWN => CommandResult::failure(
            "Unknown command",
            format_response(UNKNOWN_COMMAND, "Syntax error, command unrecognized"),
        ),
    }
}

/// Lists folders then files of `dir`.
fn handle_cmd_show(context: &HandlerContext, dir: &str) -> CommandResult {
    let manager = match context.manager(dir) {
        Ok(manager) => manager,
        Err(e) => return failure(&e, None),
    };

    let folders = match manager.folders().iter() {
        Ok(folders) => folders,
        Err(e) => return failure(&e, manager.request_dir()),
    };
    let files = match manager.files_with_type() {
        Ok(files) => files,
        Err(e) => return failure(&e, manager.request_dir()),
    };

    let mut message = format_continuation(
        LISTING,
        &format!("Listing {}", display_dir(manager.request_dir())),
    );
    if !manager.is_root() {
        message.push_str(&format_continuation(
            LISTING,
            &format!("parent {}", display_dir(manager.parent_dir())),
        ));
    }

    let mut folder_count = 0;
    for folder in folders {
        folder_count += 1;
        message.push_str(&format_continuation(
            LISTING,
            &format!("d {}/ {}", folder.name, folder.modified),
        ));
    }
    let file_count = files.len();
    for file in files {
        message.push_str(&format_continuation(
            LISTING,
            &format!(
                "f {} {} {} {} {} {}",
                file.entry.name,
                file.entry.size,
                file.mime,
                if file.is_image { "image" } else { "file" },
                manager.url_path(&file.entry.path),
                file.entry.modified
            ),
        ));
    }
    message.push_str(&format_response(
        LISTING,
        &format!("{} folders, {} files", folder_count, file_count),
    ));

    CommandResult::success(message)
}

/// Stores an upload in `dir` under the client filename.
fn handle_cmd_upload(
    context: &HandlerContext,
    dir: &str,
    filename: &str,
    payload: &[u8],
) -> CommandResult {
    let manager = match context.manager(dir) {
        Ok(manager) => manager,
        Err(e) => return failure(&e, None),
    };

    if let Err(e) = manager.check_upload_name(filename) {
        return failure(&e, manager.request_dir());
    }

    let file = match UploadedFile::stage(&context.staging_dir, filename, payload) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to stage upload {}: {}", filename, e);
            let e = MediaBrowserError::Write("Unable to receive the file".into());
            return failure(&e, manager.request_dir());
        }
    };

    match manager.upload(file) {
        Ok(_) => CommandResult::success(format_response(
            UPLOADED,
            &format!("File uploaded; dir={}", display_dir(manager.request_dir())),
        )),
        Err(e) => failure(&e, manager.request_dir()),
    }
}

/// Creates folder `name` in `dir`.
fn handle_cmd_mkdir(context: &HandlerContext, dir: &str, name: &str) -> CommandResult {
    let manager = match context.manager(dir) {
        Ok(manager) => manager,
        Err(e) => return failure(&e, None),
    };

    let created = manager
        .check_folder_name(name)
        .and_then(|_| manager.create_folder(name));
    match created {
        Ok(()) => CommandResult::success(format_response(
            FOLDER_CREATED,
            &format!("Folder created; dir={}", display_dir(manager.request_dir())),
        )),
        Err(e) => failure(&e, manager.request_dir()),
    }
}

/// Renames `element` to `new_name`; responds with the directory to go back to.
fn handle_cmd_rename(context: &HandlerContext, element: &str, new_name: &str) -> CommandResult {
    if !is_valid_name(new_name) {
        return CommandResult::failure("Bad value", format_response(BAD_VALUE, "Bad value"));
    }

    let manager = match context.manager("") {
        Ok(manager) => manager,
        Err(e) => return failure(&e, None),
    };

    let (element, dir) = match target_element(&manager, element) {
        Ok(found) => found,
        Err(e) => return failure(&e, None),
    };

    match manager.rename(&element, new_name) {
        Ok(_) => CommandResult::success(format_response(
            ELEMENT_UPDATED,
            &format!("Element renamed; dir={}", display_dir(dir.as_deref())),
        )),
        Err(e) => failure(&e, dir.as_deref()),
    }
}

/// Deletes `element`; responds with the directory to go back to.
fn handle_cmd_delete(context: &HandlerContext, element: &str) -> CommandResult {
    let manager = match context.manager("") {
        Ok(manager) => manager,
        Err(e) => return failure(&e, None),
    };

    let (element, dir) = match target_element(&manager, element) {
        Ok(found) => found,
        Err(e) => return failure(&e, None),
    };

    match manager.delete(&element) {
        Ok(()) => CommandResult::success(format_response(
            ELEMENT_UPDATED,
            &format!("Element deleted; dir={}", display_dir(dir.as_deref())),
        )),
        Err(e) => failure(&e, dir.as_deref()),
    }
}

/// Resolves a mutation target and the root-relative directory holding it.
/// The root itself is never a valid target.
fn target_element(
    manager: &PathManager,
    path: &str,
) -> Result<(Element, Option<String>), MediaBrowserError> {
    if !manager.element_exists(path, true) {
        return Err(MediaBrowserError::NotFound("Element does not exist".into()));
    }
    let element = manager.get_element(path)?;
    if manager.is_root_element(&element) {
        return Err(MediaBrowserError::NotFound(
            "Impossible to access root path".into(),
        ));
    }
    let dir = manager.relative_dir(element.containing_dir());
    info!("Resolved {} to {}", path, element.path().display());
    Ok((element, dir))
}

fn failure(err: &MediaBrowserError, dir: Option<&str>) -> CommandResult {
    handle_error(err);
    CommandResult::failure(
        err.message(),
        format_response(
            error_to_status(err),
            &format!("{}; dir={}", err.message(), display_dir(dir)),
        ),
    )
}
