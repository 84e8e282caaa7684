//! TCP connection handler
//!
//! Glue between an accepted `TcpStream` and a `Session`: splits the stream,
//! builds the liveness probe from a duplicated socket handle, and runs the
//! session to completion.

use tokio::net::TcpStream;
use tracing::debug;

use crate::error::ChatError;
use crate::liveness::TcpProbe;
use crate::room::RoomHandle;
use crate::session::{Session, SessionConfig, Termination};
use crate::types::SessionId;

/// Handle a new TCP connection
///
/// Returns why the session ended, or the error that kept it from joining.
pub async fn handle_connection(
    stream: TcpStream,
    room: RoomHandle,
    config: SessionConfig,
) -> Result<Termination, ChatError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let id = SessionId::new();
    debug!("Session {} connecting from {}", id, peer_addr);

    // The probe gets its own handle so it never contends with the reader
    let std_stream = stream.into_std()?;
    let probe = TcpProbe::new(std_stream.try_clone()?)?;
    let stream = TcpStream::from_std(std_stream)?;
    let (reader, writer) = stream.into_split();

    Session::new(id, reader, writer, probe, room, config)
        .run()
        .await
}
