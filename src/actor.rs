//! Each room runs as its own task, consuming commands from a queue.
//!
//! Commands from one connection are queued in the order they were read, so a
//! sender's messages are applied in order. Commands from different
//! connections interleave in arrival order.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::dispatch::{self, Connection};
use crate::error::GameError;
use crate::protocol::{ClientMessage, PlayerInfo, RoomSummary, ServerMessage};
use crate::room::{PlayerId, Room, RoomSnapshot};

#[derive(Debug)]
pub enum RoomCommand {
    Join {
        name: String,
        is_admin: bool,
        connection: Connection,
        reply: oneshot::Sender<PlayerInfo>,
    },
    Message {
        player_id: PlayerId,
        message: ClientMessage,
    },
    Leave {
        player_id: PlayerId,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Cloneable address of a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    summary: RoomSummary,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    /// Moves the room onto its own task. Must be called within a tokio runtime.
    pub fn spawn(room: Room) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            summary: room.summary(),
            commands,
        };
        tokio::spawn(run(room, receiver));
        handle
    }

    pub fn summary(&self) -> &RoomSummary {
        &self.summary
    }

    pub async fn join(
        &self,
        name: String,
        is_admin: bool,
        connection: Connection,
    ) -> Result<PlayerInfo, GameError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomCommand::Join {
            name,
            is_admin,
            connection,
            reply,
        })?;
        response.await.map_err(|_| GameError::RoomClosed)
    }

    pub fn dispatch(&self, player_id: PlayerId, message: ClientMessage) -> Result<(), GameError> {
        self.send(RoomCommand::Message { player_id, message })
    }

    pub fn leave(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.send(RoomCommand::Leave { player_id })
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, GameError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply })?;
        response.await.map_err(|_| GameError::RoomClosed)
    }

    fn send(&self, command: RoomCommand) -> Result<(), GameError> {
        self.commands
            .send(command)
            .map_err(|_| GameError::RoomClosed)
    }
}

async fn run(mut room: Room, mut commands: mpsc::UnboundedReceiver<RoomCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            RoomCommand::Join {
                name,
                is_admin,
                connection,
                reply,
            } => {
                let info = room.join(name, is_admin, connection);
                if reply.send(info.clone()).is_err() {
                    // The joining connection is already gone.
                    let _ = room.disconnect(info.player_id);
                }
            }
            RoomCommand::Message { player_id, message } => {
                let kind = message.kind();
                if let Err(e) = room.apply(player_id, message) {
                    warn!(room_id = %room.id(), %player_id, "rejected {kind}: {e}");
                    if let Ok(player) = room.player(player_id) {
                        dispatch::send_to(player, &ServerMessage::Error(e.to_string()));
                    }
                }
            }
            RoomCommand::Leave { player_id } => {
                if let Err(e) = room.disconnect(player_id) {
                    warn!(room_id = %room.id(), %player_id, "unable to remove player: {e}");
                }
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(room.snapshot());
            }
        }
    }
    debug!(room_id = %room.id(), "room task finished");
}
