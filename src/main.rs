//! Media browser - Entry Point
//!
//! A file manager confined to a single root directory.

use log::info;
use std::process;

use media_browser::{MediaBrowserError, Server};
use media_browser::config::ServerConfig;
use media_browser::error::handlers::handle_error;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching media browser...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&MediaBrowserError::from(e));
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            process::exit(1);
        }
    };

    server.start().await;
}
