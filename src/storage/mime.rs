//! Content sniffing
//!
//! Classifies a file by its leading bytes so the listing can tell images
//! (thumbnails) from everything else (icons).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from the start of a file when sniffing
const PROBE_LEN: usize = 512;

/// Detect the MIME type of a file from its content.
pub fn sniff_file(path: &Path) -> io::Result<&'static str> {
    let mut probe = Vec::with_capacity(PROBE_LEN);
    File::open(path)?
        .take(PROBE_LEN as u64)
        .read_to_end(&mut probe)?;
    Ok(sniff(&probe))
}

/// Detect the MIME type of a content prefix.
pub fn sniff(content: &[u8]) -> &'static str {
    if content.is_empty() {
        return "application/x-empty";
    }

    if content.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if content.len() >= 12 && &content[0..4] == b"RIFF" && &content[8..12] == b"WEBP" {
        return "image/webp";
    }
    if content.starts_with(b"BM") && content.len() >= 14 {
        return "image/bmp";
    }
    if content.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || content.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return "image/tiff";
    }
    if content.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return "image/vnd.microsoft.icon";
    }
    if content.starts_with(b"%PDF") {
        return "application/pdf";
    }
    if content.starts_with(&[0x50, 0x4B, 0x03, 0x04]) || content.starts_with(&[0x50, 0x4B, 0x05, 0x06]) {
        return "application/zip";
    }

    match std::str::from_utf8(content) {
        Ok(text) if !text.contains('\0') => {
            let head = text.trim_start();
            if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
                "image/svg+xml"
            } else {
                "text/plain"
            }
        }
        _ => "application/octet-stream",
    }
}

/// True for any `image/*` type.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}
