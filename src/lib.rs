pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

pub use error::MediaBrowserError;
pub use server::Server;
pub use storage::{Element, MediaRoot, PathManager, UploadedFile};
