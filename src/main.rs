//! Line Chat Server - Entry Point
//!
//! Starts the TCP listener and Room actor, accepting connections.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use line_chat::{handle_connection, Room, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=line_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("line_chat=info")),
        )
        .init();

    let config = ServerConfig::parse();
    let session_config = config.session_config();

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Chat server listening on {}", config.addr);

    // One room for the whole process, shared by every connection
    let room = Room::spawn(config.intake_capacity.get());

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let room = room.clone();
                let session_config = session_config.clone();

                tokio::spawn(async move {
                    match handle_connection(stream, room, session_config).await {
                        Ok(reason) => info!("Connection from {} closed: {}", addr, reason),
                        Err(e) if e.is_naming_error() => {
                            info!("Connection from {} rejected: {}", addr, e)
                        }
                        Err(e) => warn!("Connection from {} ended: {}", addr, e),
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
