use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::client::SessionRegistry;
use crate::config::ServerConfig;
use crate::protocol::responses::{PAYLOAD_TOO_LARGE, UNKNOWN_COMMAND, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus, HandlerContext, handle_command, parse_command};

/// Handles one client session using Tokio async runtime.
///
/// - Reads command lines (and upload payloads) from the client.
/// - Runs each command on the blocking pool against a fresh request context.
/// - Removes the session from the registry when the client leaves.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    sessions: SessionRegistry,
    context: Arc<HandlerContext>,
    config: Arc<ServerConfig>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {
                if line.len() > config.max_command_length {
                    let _ = write_half
                        .write_all(format_response(UNKNOWN_COMMAND, "Command too long").as_bytes())
                        .await;
                    continue;
                }

                let command = parse_command(line.trim_end_matches(['\r', '\n']));
                info!("Received from {}: {:?}", client_addr, &command);

                if let Some(session) = sessions.lock().await.get_mut(&client_addr) {
                    session.record_command();
                }

                let payload = match &command {
                    Command::UPLOAD { size, .. } => {
                        if *size > config.max_upload_size_bytes() {
                            warn!("Client {} sent an upload of {} bytes, over the limit", client_addr, size);
                            let _ = write_half
                                .write_all(
                                    format_response(PAYLOAD_TOO_LARGE, "File too large, closing connection")
                                        .as_bytes(),
                                )
                                .await;
                            break;
                        }
                        let mut payload = vec![0u8; *size as usize];
                        if let Err(e) = reader.read_exact(&mut payload).await {
                            error!("Failed to read upload payload from {}: {}", client_addr, e);
                            break;
                        }
                        Some(payload)
                    }
                    _ => None,
                };

                let result = run_command(Arc::clone(&context), command, payload).await;

                if let Some(msg) = &result.message {
                    if let Err(e) = write_half.write_all(msg.as_bytes()).await {
                        error!("Failed to write to {}: {}", client_addr, e);
                        break;
                    }
                }

                if result.status == CommandStatus::CloseConnection {
                    info!("Client {} requested to quit", client_addr);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    let mut sessions_guard = sessions.lock().await;
    if let Some(session) = sessions_guard.remove(&client_addr) {
        info!(
            "Client {} disconnected after {} commands ({}s)",
            client_addr,
            session.commands_handled(),
            session.uptime().as_secs()
        );
    }
}

/// Filesystem work is blocking, keep it off the async workers.
async fn run_command(
    context: Arc<HandlerContext>,
    command: Command,
    payload: Option<Vec<u8>>,
) -> CommandResult {
    let outcome =
        tokio::task::spawn_blocking(move || handle_command(&context, &command, payload.as_deref()))
            .await;

    outcome.unwrap_or_else(|e| {
        error!("Command handler task failed: {}", e);
        CommandResult::failure(
            "Internal error",
            format_response(UNKNOWN_COMMAND, "Internal server error"),
        )
    })
}
