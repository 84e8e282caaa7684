//! Error types for the chat server
//!
//! Defines session-level errors and per-member delivery errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Session-level errors
///
/// Naming errors are reported to the offending client and end the
/// connection before it joins the room. The rest end only the session
/// that hit them. None of them is fatal to the server process.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Proposed name is longer than the allowed maximum
    #[error("username too long")]
    NameTooLong,

    /// Proposed name contains a byte that is not ASCII alphanumeric
    #[error("username character not alphanumeric")]
    NameNotAlphanumeric,

    /// Proposed name was an empty line
    #[error("username is empty")]
    NameEmpty,

    /// Another current member already uses this name
    #[error("username already exists in chat room")]
    NameTaken,

    /// Chat line exceeded the maximum length before its terminator
    #[error("message too long")]
    MessageTooLong,

    /// Peer closed the connection
    #[error("connection closed")]
    ConnectionClosed,

    /// Writing to the peer failed
    #[error("write failed: {0}")]
    WriteFailed(std::io::Error),

    /// Room dispatcher is gone (server shutting down)
    #[error("room closed")]
    RoomClosed,

    /// IO error while reading from the peer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Whether this error is reported back to the client during naming
    pub fn is_naming_error(&self) -> bool {
        matches!(
            self,
            ChatError::NameTooLong
                | ChatError::NameNotAlphanumeric
                | ChatError::NameEmpty
                | ChatError::NameTaken
        )
    }
}

/// Message send errors
///
/// Occurs when the dispatcher cannot hand a line to a member's outbound queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The member's outbound queue is at capacity
    #[error("Queue full")]
    QueueFull,

    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_errors() {
        assert!(ChatError::NameTooLong.is_naming_error());
        assert!(ChatError::NameNotAlphanumeric.is_naming_error());
        assert!(ChatError::NameEmpty.is_naming_error());
        assert!(ChatError::NameTaken.is_naming_error());
        assert!(!ChatError::MessageTooLong.is_naming_error());
        assert!(!ChatError::ConnectionClosed.is_naming_error());
    }

    #[test]
    fn test_error_text() {
        assert_eq!(ChatError::NameTooLong.to_string(), "username too long");
        assert_eq!(
            ChatError::NameTaken.to_string(),
            "username already exists in chat room"
        );
    }
}
