use log::{error, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::client::{Session, SessionRegistry, handle_client};
use crate::config::ServerConfig;
use crate::error::MediaBrowserError;
use crate::protocol::HandlerContext;
use crate::protocol::responses::{READY, TOO_MANY_CLIENTS, format_response};
use crate::storage::MediaRoot;

pub struct Server {
    sessions: SessionRegistry,
    context: Arc<HandlerContext>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Resolve the root and bind the control socket. Both failures are fatal.
    pub async fn new(config: ServerConfig) -> Result<Self, MediaBrowserError> {
        let root = MediaRoot::open(&config.root_dir, &config.base_dir_path())?;
        info!("Media root: {} ({})", root.path().display(), root.dir());

        let staging_dir = config.upload_tmp_path();
        if !staging_dir.is_dir() {
            return Err(MediaBrowserError::Config(format!(
                "Upload staging directory {} does not exist",
                staging_dir.display()
            )));
        }

        let socket = config.control_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            MediaBrowserError::Config(format!("Failed to bind to {}: {}", socket, e))
        })?;
        info!("Server bound to {}", socket);

        Ok(Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            context: Arc::new(HandlerContext::new(Arc::new(root), staging_dir)),
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!(
            "Starting media browser on {} (max {} clients)",
            self.config.control_socket(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let sessions = Arc::clone(&self.sessions);
                    let context = Arc::clone(&self.context);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, sessions, context, config).await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Admits a new client if there is room, then hands it to the session loop.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    sessions: SessionRegistry,
    context: Arc<HandlerContext>,
    config: Arc<ServerConfig>,
) -> Result<(), std::io::Error> {
    let admitted = {
        let mut sessions_guard = sessions.lock().await;
        if sessions_guard.len() >= config.max_clients {
            false
        } else {
            sessions_guard.insert(client_addr, Session::new(client_addr));
            info!(
                "Accepted client {} ({}/{} clients)",
                client_addr,
                sessions_guard.len(),
                config.max_clients
            );
            true
        }
    };

    if !admitted {
        warn!("Refused client {}: {} clients connected", client_addr, config.max_clients);
        stream
            .write_all(
                format_response(TOO_MANY_CLIENTS, "Too many connections. Try again later.")
                    .as_bytes(),
            )
            .await?;
        return Ok(());
    }

    let greeting = format_response(READY, "Media browser ready");
    if let Err(e) = stream.write_all(greeting.as_bytes()).await {
        sessions.lock().await.remove(&client_addr);
        return Err(e);
    }

    handle_client(stream, client_addr, sessions, context, config).await;
    Ok(())
}
