//! Message protocol definitions
//!
//! Line-based text protocol: every server line ends with `\n`.
//! `ServerMessage` renders the fixed formats into bytes ready for a
//! member's outbound queue.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ChatError;
use crate::types::ParticipantName;

/// Maximum chat line length in bytes, including the `\n` terminator
pub const MAX_MESSAGE_LENGTH: usize = 1005;

/// Sent to every new connection before the name is read
pub const WELCOME_MESSAGE: &str = "Welcome to this DeLightFull Chat Room! What is your name?\n";

/// Chat line that ends the session without broadcasting anything
pub const EXIT_COMMAND: &[u8] = b"exit\n";

/// Prefix of the roster line sent to a newly joined member
const ROSTER_PREFIX: &str = "* Users in Room: ";

/// Chat message submitted by a member
///
/// `text` keeps its trailing `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: ParticipantName,
    pub text: Bytes,
}

impl Message {
    pub fn new(sender: ParticipantName, text: Bytes) -> Self {
        Self { sender, text }
    }

    /// Whether this line is the literal exit command
    pub fn is_exit(&self) -> bool {
        self.text.as_ref() == EXIT_COMMAND
    }
}

/// Server → Client line
#[derive(Debug, Clone)]
pub enum ServerMessage<'a> {
    /// Greeting, asks for the name
    Welcome,
    /// Names of members present before the recipient joined
    Roster(Vec<&'a ParticipantName>),
    /// Another member joined
    Joined(&'a ParticipantName),
    /// Another member left
    Left(&'a ParticipantName),
    /// Chat line from another member
    Chat(&'a Message),
    /// Naming rejected
    Error(&'a ChatError),
}

impl ServerMessage<'_> {
    /// Render the line, terminator included
    pub fn to_bytes(&self) -> Bytes {
        match self {
            ServerMessage::Welcome => Bytes::from_static(WELCOME_MESSAGE.as_bytes()),
            ServerMessage::Roster(names) => {
                let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
                Bytes::from(format!("{}{}\n", ROSTER_PREFIX, names.join(", ")))
            }
            ServerMessage::Joined(name) => {
                Bytes::from(format!("* {} joined this chat room\n", name))
            }
            ServerMessage::Left(name) => Bytes::from(format!("* {} left the chat room\n", name)),
            ServerMessage::Chat(msg) => {
                let mut buf = BytesMut::with_capacity(msg.sender.as_str().len() + 3 + msg.text.len());
                buf.put_u8(b'[');
                buf.put_slice(msg.sender.as_str().as_bytes());
                buf.put_slice(b"] ");
                buf.put_slice(&msg.text);
                buf.freeze()
            }
            ServerMessage::Error(err) => Bytes::from(format!("{}\n", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ParticipantName {
        ParticipantName::parse(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_empty_roster() {
        let line = ServerMessage::Roster(Vec::new()).to_bytes();
        assert_eq!(&line[..], b"* Users in Room: \n");
    }

    #[test]
    fn test_populated_roster() {
        let alice = name("alice");
        let bob = name("bob");
        let line = ServerMessage::Roster(vec![&alice, &bob]).to_bytes();
        assert_eq!(&line[..], b"* Users in Room: alice, bob\n");

        let line = ServerMessage::Roster(vec![&alice]).to_bytes();
        assert_eq!(&line[..], b"* Users in Room: alice\n");
    }

    #[test]
    fn test_announcements() {
        let bob = name("bob");
        assert_eq!(
            &ServerMessage::Joined(&bob).to_bytes()[..],
            b"* bob joined this chat room\n"
        );
        assert_eq!(
            &ServerMessage::Left(&bob).to_bytes()[..],
            b"* bob left the chat room\n"
        );
    }

    #[test]
    fn test_chat_keeps_raw_text() {
        let msg = Message::new(name("bob"), Bytes::from_static(b"hi \xff there\n"));
        assert_eq!(
            &ServerMessage::Chat(&msg).to_bytes()[..],
            b"[bob] hi \xff there\n"
        );
    }

    #[test]
    fn test_exit_detection() {
        assert!(Message::new(name("a"), Bytes::from_static(b"exit\n")).is_exit());
        assert!(!Message::new(name("a"), Bytes::from_static(b"exit now\n")).is_exit());
        assert!(!Message::new(name("a"), Bytes::from_static(b"Exit\n")).is_exit());
    }

    #[test]
    fn test_error_line() {
        let line = ServerMessage::Error(&ChatError::NameNotAlphanumeric).to_bytes();
        assert_eq!(&line[..], b"username character not alphanumeric\n");
    }
}
