//! Response handling
//!
//! Response codes of the line protocol and their formatting.

pub const LISTING: u16 = 212;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const UPLOADED: u16 = 226;
pub const ELEMENT_UPDATED: u16 = 250;
pub const FOLDER_CREATED: u16 = 257;
pub const PAYLOAD_TOO_LARGE: u16 = 552;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const TOO_MANY_CLIENTS: u16 = 421;
pub const BAD_VALUE: u16 = 501;

/// Format a single response line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format a continuation line of a multi-line response
pub fn format_continuation(code: u16, message: &str) -> String {
    format!("{}-{}\r\n", code, message)
}

/// Root-relative directory as shown to clients, `/` for the root
pub fn display_dir(dir: Option<&str>) -> String {
    match dir {
        Some(dir) => format!("/{}", dir),
        None => "/".to_string(),
    }
}
