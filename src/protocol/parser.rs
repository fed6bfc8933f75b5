//! Command parsing
//!
//! Turns a raw command line into a `Command`. Malformed arguments yield
//! `Command::UNKNOWN`.

use crate::protocol::Command;

/// Parses a raw command line received from a client.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let args: Vec<&str> = parts.collect();

    match (cmd.as_str(), args.as_slice()) {
        ("SHOW", []) => Command::SHOW(String::new()),
        ("SHOW", [dir]) => Command::SHOW(request_dir(dir)),
        ("UPLOAD", [dir, filename, size]) => match size.parse::<u64>() {
            Ok(size) => Command::UPLOAD {
                dir: request_dir(dir),
                filename: filename.to_string(),
                size,
            },
            Err(_) => Command::UNKNOWN,
        },
        ("MKDIR", [dir, name]) => Command::MKDIR {
            dir: request_dir(dir),
            name: name.to_string(),
        },
        ("RENAME", [element, new_name]) => Command::RENAME {
            element: element.to_string(),
            new_name: new_name.to_string(),
        },
        ("DELETE", [element]) => Command::DELETE(element.to_string()),
        ("QUIT", []) => Command::QUIT,
        _ => Command::UNKNOWN,
    }
}

/// `/` names the root; leading slashes are dropped otherwise.
fn request_dir(arg: &str) -> String {
    arg.trim_start_matches('/').to_string()
}
