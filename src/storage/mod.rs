//! File system storage management
//!
//! Root confinement, path resolution and the mutating operations performed
//! on behalf of a request.

pub mod element;
pub mod listing;
pub mod manager;
pub mod mime;
pub mod operations;
pub mod permissions;
pub mod results;
pub mod root;
pub mod upload;
pub mod validation;

pub use element::Element;
pub use listing::Listing;
pub use manager::{PathManager, RequestLocation};
pub use results::{DeleteReport, EntryKind, ListEntry, TypedFile};
pub use root::MediaRoot;
pub use upload::UploadedFile;
pub use validation::{MAX_FOLDER_NAME_LENGTH, is_valid_name, validate_file_name, validate_folder_name};
