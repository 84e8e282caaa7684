//! Per-participant session
//!
//! Drives one connection through `Connecting → Naming → Active →
//! Terminating → Terminated`.
//!
//! Once active, three loops run concurrently: a reader forwarding chat lines
//! to the room, a writer draining the outbound queue, and a liveness probe.
//! They share one `CancellationToken`. Whichever loop hits a terminal
//! condition cancels the token; the others observe it and return. The join
//! point waits for all three and only then sends the single `Leave`, so the
//! room sees exactly one leave per session however the loops race.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::codec::{LineCodec, NameCodec};
use crate::error::ChatError;
use crate::liveness::LivenessProbe;
use crate::member::Member;
use crate::message::{Message, ServerMessage};
use crate::room::RoomHandle;
use crate::types::{ParticipantName, SessionId};

/// Per-session tunables
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the room → session outbound queue
    pub outbound_capacity: usize,
    /// How often the liveness probe runs
    pub liveness_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            liveness_interval: Duration::from_millis(500),
        }
    }
}

/// Why an active session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Client sent the exit command
    Exit,
    /// Peer closed the connection or the read failed
    ConnectionClosed,
    /// Chat line over the maximum length
    MessageTooLong,
    /// Writing to the peer failed
    WriteFailed,
    /// Liveness probe found the connection dead
    LivenessFailed,
    /// Room cancelled the session (outbound queue overflow)
    Evicted,
    /// Room dispatcher is gone
    RoomClosed,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Termination::Exit => "exit command",
            Termination::ConnectionClosed => "connection closed",
            Termination::MessageTooLong => "message too long",
            Termination::WriteFailed => "write failed",
            Termination::LivenessFailed => "liveness check failed",
            Termination::Evicted => "evicted",
            Termination::RoomClosed => "room closed",
        };
        f.write_str(reason)
    }
}

/// How one of the three loops returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    /// Observed cancellation raised elsewhere
    Stopped,
    /// Hit a terminal condition itself
    Terminated(Termination),
}

/// One connected participant
///
/// Generic over the transport so the same logic runs on TCP halves or an
/// in-memory duplex.
pub struct Session<R, W, P> {
    id: SessionId,
    reader: R,
    writer: W,
    probe: P,
    room: RoomHandle,
    config: SessionConfig,
}

impl<R, W, P> Session<R, W, P>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    P: LivenessProbe,
{
    pub fn new(
        id: SessionId,
        reader: R,
        writer: W,
        probe: P,
        room: RoomHandle,
        config: SessionConfig,
    ) -> Self {
        Self {
            id,
            reader,
            writer,
            probe,
            room,
            config,
        }
    }

    /// Run the session to completion
    ///
    /// `Err` means the session never became active (bad name, name taken,
    /// disconnect while naming). `Ok` carries why an active session ended.
    pub async fn run(self) -> Result<Termination, ChatError> {
        let Session {
            id,
            reader,
            mut writer,
            mut probe,
            room,
            config,
        } = self;

        write_line(&mut writer, &ServerMessage::Welcome.to_bytes())
            .await
            .map_err(ChatError::WriteFailed)?;
        debug!("Session {} naming", id);

        let mut framed = FramedRead::new(reader, NameCodec::new());
        let name = match framed.next().await {
            Some(Ok(name)) => name,
            Some(Err(err)) => {
                if err.is_naming_error() {
                    reject(&mut writer, &err).await;
                }
                return Err(err);
            }
            None => return Err(ChatError::ConnectionClosed),
        };

        let cancel_token = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));
        let member = Member::new(id, name.clone(), outbound_tx, cancel_token.clone());

        if let Err(err) = room.join(member).await {
            if err.is_naming_error() {
                reject(&mut writer, &err).await;
            }
            return Err(err);
        }
        info!("Session {} active as '{}'", id, name);

        let lines = framed.map_decoder(|_| LineCodec::default());
        let (read_exit, write_exit, probe_exit) = tokio::join!(
            read_loop(id, &name, lines, &room, &cancel_token),
            write_loop(outbound_rx, &mut writer, &cancel_token),
            liveness_loop(&mut probe, config.liveness_interval, &cancel_token),
        );

        // Cancelled without any loop failing means the room evicted us
        let reason = [read_exit, write_exit, probe_exit]
            .into_iter()
            .find_map(|exit| match exit {
                LoopExit::Terminated(reason) => Some(reason),
                LoopExit::Stopped => None,
            })
            .unwrap_or(Termination::Evicted);
        debug!("Session {} terminating: {}", id, reason);

        if room.leave(id, name.clone()).await.is_err() {
            debug!("Room closed before '{}' could leave", name);
        }
        if let Err(e) = writer.shutdown().await {
            debug!("Could not close connection for '{}': {}", name, e);
        }

        info!("Session {} ('{}') terminated: {}", id, name, reason);
        Ok(reason)
    }
}

/// Forward chat lines from the peer to the room
async fn read_loop<R>(
    id: SessionId,
    name: &ParticipantName,
    mut lines: FramedRead<R, LineCodec>,
    room: &RoomHandle,
    cancel_token: &CancellationToken,
) -> LoopExit
where
    R: AsyncRead + Unpin,
{
    let exit = loop {
        let frame = tokio::select! {
            biased;
            () = cancel_token.cancelled() => break LoopExit::Stopped,
            frame = lines.next() => frame,
        };

        let text = match frame {
            Some(Ok(text)) => text,
            Some(Err(ChatError::MessageTooLong)) => {
                break LoopExit::Terminated(Termination::MessageTooLong);
            }
            Some(Err(err)) => {
                debug!("Read error for '{}': {}", name, err);
                break LoopExit::Terminated(Termination::ConnectionClosed);
            }
            None => break LoopExit::Terminated(Termination::ConnectionClosed),
        };

        let message = Message::new(name.clone(), text);
        if message.is_exit() {
            break LoopExit::Terminated(Termination::Exit);
        }

        let submitted = tokio::select! {
            biased;
            () = cancel_token.cancelled() => break LoopExit::Stopped,
            submitted = room.chat(id, message) => submitted,
        };
        if submitted.is_err() {
            break LoopExit::Terminated(Termination::RoomClosed);
        }
    };

    cancel_token.cancel();
    exit
}

/// Drain the outbound queue into the peer
async fn write_loop<W>(
    mut outbound: mpsc::Receiver<Bytes>,
    writer: &mut W,
    cancel_token: &CancellationToken,
) -> LoopExit
where
    W: AsyncWrite + Unpin,
{
    let exit = loop {
        let line = tokio::select! {
            biased;
            () = cancel_token.cancelled() => break LoopExit::Stopped,
            line = outbound.recv() => line,
        };

        // Sender dropped: the dispatcher is gone
        let Some(line) = line else {
            break LoopExit::Terminated(Termination::RoomClosed);
        };

        let written = tokio::select! {
            biased;
            () = cancel_token.cancelled() => break LoopExit::Stopped,
            written = write_line(writer, &line) => written,
        };
        if let Err(e) = written {
            debug!("Write error: {}", e);
            break LoopExit::Terminated(Termination::WriteFailed);
        }
    };

    cancel_token.cancel();
    exit
}

/// Periodically probe the connection
async fn liveness_loop<P>(
    probe: &mut P,
    period: Duration,
    cancel_token: &CancellationToken,
) -> LoopExit
where
    P: LivenessProbe,
{
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            biased;
            () = cancel_token.cancelled() => break LoopExit::Stopped,
            _ = ticker.tick() => {}
        }

        if let Err(e) = probe.check() {
            debug!("Liveness check failed: {}", e);
            break LoopExit::Terminated(Termination::LivenessFailed);
        }
    };

    cancel_token.cancel();
    exit
}

async fn write_line<W>(writer: &mut W, line: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line).await?;
    writer.flush().await
}

/// Best-effort error report, then close
async fn reject<W>(writer: &mut W, err: &ChatError)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = write_line(writer, &ServerMessage::Error(err).to_bytes()).await {
        debug!("Could not report '{}' to client: {}", err, e);
    }
    let _ = writer.shutdown().await;
}
