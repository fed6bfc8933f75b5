//! Server core functionality
//!
//! Accept loop and session admission.

pub mod core;

pub use core::Server;
