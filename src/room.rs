//! Room actor implementation
//!
//! The single dispatcher that owns the membership list. Joins, leaves and
//! chat lines all arrive on one command channel and are processed in order,
//! so every member observes the same sequence of events. No locks are
//! needed: nothing else touches `Members`.

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{ChatError, SendError};
use crate::member::{Member, Members};
use crate::message::{Message, ServerMessage};
use crate::types::{ParticipantName, SessionId};

/// Commands sent from sessions to the Room actor
#[derive(Debug)]
pub enum RoomCommand {
    /// Named session wants to join
    Join {
        member: Member,
        respond_to: oneshot::Sender<Result<(), ChatError>>,
    },
    /// Session is gone
    Leave {
        id: SessionId,
        name: ParticipantName,
    },
    /// Chat line from a member
    Chat {
        id: SessionId,
        message: Message,
    },
    /// Snapshot of member names in join order
    Names {
        respond_to: oneshot::Sender<Vec<ParticipantName>>,
    },
}

/// Handle used by sessions to talk to the Room actor
#[derive(Debug, Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomCommand>) -> Self {
        Self { sender }
    }

    /// Add a member, failing with `NameTaken` if the name is in use
    ///
    /// On success the member's queue already holds the roster line.
    pub async fn join(&self, member: Member) -> Result<(), ChatError> {
        let (respond_to, response) = oneshot::channel();
        self.send(RoomCommand::Join { member, respond_to }).await?;
        response.await.map_err(|_| ChatError::RoomClosed)?
    }

    /// Remove a member; no-op if it was already removed
    pub async fn leave(&self, id: SessionId, name: ParticipantName) -> Result<(), ChatError> {
        self.send(RoomCommand::Leave { id, name }).await
    }

    /// Submit a chat line for broadcast
    pub async fn chat(&self, id: SessionId, message: Message) -> Result<(), ChatError> {
        self.send(RoomCommand::Chat { id, message }).await
    }

    /// Current member names in join order
    pub async fn names(&self) -> Result<Vec<ParticipantName>, ChatError> {
        let (respond_to, response) = oneshot::channel();
        self.send(RoomCommand::Names { respond_to }).await?;
        response.await.map_err(|_| ChatError::RoomClosed)
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), ChatError> {
        self.sender.send(cmd).await.map_err(|_| ChatError::RoomClosed)
    }
}

/// The Room actor
///
/// Runs until every `RoomHandle` is dropped.
pub struct Room {
    /// Current members in join order
    members: Members,
    /// Command receiver channel
    receiver: mpsc::Receiver<RoomCommand>,
}

impl Room {
    /// Create a new Room with the given command receiver
    pub fn new(receiver: mpsc::Receiver<RoomCommand>) -> Self {
        Self {
            members: Members::new(),
            receiver,
        }
    }

    /// Create the command channel, start the actor, and return its handle
    pub fn spawn(intake_capacity: usize) -> RoomHandle {
        let (sender, receiver) = mpsc::channel(intake_capacity);
        tokio::spawn(Room::new(receiver).run());
        RoomHandle::new(sender)
    }

    /// Run the Room event loop
    pub async fn run(mut self) {
        info!("Room dispatcher started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("Room dispatcher shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { member, respond_to } => {
                let id = member.id;
                let name = member.name.clone();
                let result = self.handle_join(member);
                let joined = result.is_ok();
                if respond_to.send(result).is_err() && joined {
                    // Session vanished while waiting; undo so the name is freed
                    debug!("Session {} gone before join completed", id);
                    self.handle_leave(id, name);
                }
            }
            RoomCommand::Leave { id, name } => {
                self.handle_leave(id, name);
            }
            RoomCommand::Chat { id, message } => {
                self.handle_chat(id, message);
            }
            RoomCommand::Names { respond_to } => {
                let names = self.members.names().into_iter().cloned().collect();
                let _ = respond_to.send(names);
            }
        }
    }

    /// Handle a join request
    ///
    /// Announces to existing members, sends the roster to the newcomer
    /// only, then appends it.
    fn handle_join(&mut self, member: Member) -> Result<(), ChatError> {
        if self.members.contains_name(&member.name) {
            info!("Rejected join for '{}': name taken", member.name);
            return Err(ChatError::NameTaken);
        }

        let announcement = ServerMessage::Joined(&member.name).to_bytes();
        self.broadcast(announcement, None);

        let roster = ServerMessage::Roster(self.members.names()).to_bytes();
        if let Err(e) = member.deliver(roster) {
            warn!("Could not deliver roster to '{}': {}", member.name, e);
            member.evict();
        }

        info!("'{}' joined (session {})", member.name, member.id);
        self.members
            .push(member)
            .map_err(|_| ChatError::NameTaken)?;

        debug!("Total members: {}", self.members.len());
        Ok(())
    }

    /// Handle a leave; unknown sessions are ignored
    fn handle_leave(&mut self, id: SessionId, name: ParticipantName) {
        let Some(member) = self.members.remove(id, &name) else {
            debug!("Leave for '{}' ignored: not a member", name);
            return;
        };

        info!("'{}' left (session {})", member.name, member.id);

        let announcement = ServerMessage::Left(&member.name).to_bytes();
        self.broadcast(announcement, None);

        debug!("Total members: {}", self.members.len());
    }

    /// Handle a chat line: everyone but the sender gets it
    fn handle_chat(&mut self, id: SessionId, message: Message) {
        let line = ServerMessage::Chat(&message).to_bytes();
        self.broadcast(line, Some(id));
    }

    /// Queue a line for every member except `skip`, in join order
    ///
    /// Members whose queue is full are evicted; their leave follows
    /// through the normal session teardown.
    fn broadcast(&self, line: Bytes, skip: Option<SessionId>) {
        for member in self.members.iter() {
            if Some(member.id) == skip {
                continue;
            }
            match member.deliver(line.clone()) {
                Ok(()) => {}
                Err(SendError::QueueFull) => {
                    warn!("Outbound queue full for '{}', evicting", member.name);
                    member.evict();
                }
                Err(SendError::ChannelClosed) => {
                    debug!("'{}' is tearing down, skipping delivery", member.name);
                }
            }
        }
    }
}
