//! Client session state
//!
//! Tracks the connected sessions. Sessions carry no browsing state: every
//! command builds its own request context.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Shared table of connected sessions
pub type SessionRegistry = Arc<Mutex<HashMap<SocketAddr, Session>>>;

/// One connected client.
#[derive(Debug, Clone)]
pub struct Session {
    client_addr: SocketAddr,
    connected_at: Instant,
    commands_handled: u64,
}

impl Session {
    pub fn new(client_addr: SocketAddr) -> Self {
        Self {
            client_addr,
            connected_at: Instant::now(),
            commands_handled: 0,
        }
    }

    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    pub fn commands_handled(&self) -> u64 {
        self.commands_handled
    }

    /// Time since the client connected.
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn record_command(&mut self) {
        self.commands_handled += 1;
    }
}
