//! Error handling
//!
//! Defines the media browser error taxonomy and its response-code mapping.

pub mod handlers;
pub mod types;

pub use types::*;
