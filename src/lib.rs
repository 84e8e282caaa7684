//! Line Chat Server Library
//!
//! A line-oriented TCP chat room built on tokio, using the Actor pattern
//! for room state.
//!
//! # Features
//! - Welcome prompt and unique alphanumeric display names
//! - Roster of present members sent on join
//! - Join, leave and chat broadcasts to every other member
//! - `exit` command, oversized lines and dead connections end the session
//! - Slow members are evicted instead of stalling the room
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Room` is the single dispatcher owning the membership list
//! - Each connection runs a `Session` with reader, writer and liveness loops
//! - No locks needed - every membership change and broadcast goes through
//!   the room's command channel, so all members see one event order
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use line_chat::{handle_connection, Room, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:13337").await.unwrap();
//!     let room = Room::spawn(256);
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let room = room.clone();
//!         tokio::spawn(handle_connection(stream, room, SessionConfig::default()));
//!     }
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod liveness;
pub mod member;
pub mod message;
pub mod room;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{ChatError, SendError};
pub use handler::handle_connection;
pub use liveness::{LivenessProbe, TcpProbe};
pub use member::{Member, Members};
pub use message::{Message, ServerMessage};
pub use room::{Room, RoomCommand, RoomHandle};
pub use session::{Session, SessionConfig, Termination};
pub use types::{ParticipantName, SessionId};
