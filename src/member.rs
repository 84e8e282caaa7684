//! Room membership
//!
//! `Member` is the room's handle to one joined session: it can queue lines
//! for the session's writer and cancel the session, nothing more. The
//! session owns the socket. `Members` is the ordered membership list.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::types::{ParticipantName, SessionId};

/// A joined participant as seen by the room
#[derive(Debug)]
pub struct Member {
    /// Session this member belongs to
    pub id: SessionId,
    /// Display name, unique among members
    pub name: ParticipantName,
    /// Room → session outbound queue
    sender: mpsc::Sender<Bytes>,
    /// Cancels every loop of the owning session
    cancel_token: CancellationToken,
}

impl Member {
    pub fn new(
        id: SessionId,
        name: ParticipantName,
        sender: mpsc::Sender<Bytes>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            id,
            name,
            sender,
            cancel_token,
        }
    }

    /// Queue a line without waiting
    ///
    /// The dispatcher never blocks on a member; a full queue is reported
    /// so the caller can evict.
    pub fn deliver(&self, line: Bytes) -> Result<(), SendError> {
        self.sender.try_send(line).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Ask the owning session to shut down
    pub fn evict(&self) {
        self.cancel_token.cancel();
    }
}

/// Ordered membership, join order, no duplicate names
#[derive(Debug, Default)]
pub struct Members {
    members: Vec<Member>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a name is already in use
    pub fn contains_name(&self, name: &ParticipantName) -> bool {
        self.members.iter().any(|m| &m.name == name)
    }

    /// Append a member
    ///
    /// Hands the member back if the name is already taken.
    pub fn push(&mut self, member: Member) -> Result<(), Member> {
        if self.contains_name(&member.name) {
            return Err(member);
        }
        self.members.push(member);
        Ok(())
    }

    /// Remove the member with this id and name
    ///
    /// Returns None if no such member exists (already removed).
    pub fn remove(&mut self, id: SessionId, name: &ParticipantName) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| m.id == id && &m.name == name)?;
        Some(self.members.remove(index))
    }

    /// Member names in join order
    pub fn names(&self) -> Vec<&ParticipantName> {
        self.members.iter().map(|m| &m.name).collect()
    }

    /// Iterate members in join order
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// Number of current members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if nobody is in the room
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
