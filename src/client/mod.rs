//! Client management
//!
//! Per-connection session loop and the registry of active sessions.

pub mod handler;
pub mod session;

pub use handler::handle_client;
pub use session::{Session, SessionRegistry};
