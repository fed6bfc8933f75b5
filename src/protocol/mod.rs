//! Media browser line protocol
//!
//! Command parsing, controller-level handling and response formatting. This
//! layer is a thin caller of the storage core.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus};
pub use handlers::{HandlerContext, handle_command};
pub use parser::parse_command;
