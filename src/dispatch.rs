//! Best-effort delivery of server messages to connections.
//!
//! A connection is the sending half of the queue drained by that client's
//! writer task, so writes to one socket are serialized no matter how many
//! rooms or tasks push to it.

use axum::extract::ws::Message;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

use crate::protocol::ServerMessage;
use crate::room::{Player, PlayerId};

pub type Connection = UnboundedSender<Message>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("connection closed")]
    Closed,
}

/// Creates a connection and the receiver its writer task drains.
pub fn connection() -> (Connection, UnboundedReceiver<Message>) {
    mpsc::unbounded_channel()
}

pub fn try_send(connection: &Connection, message: Message) -> Result<(), DispatchError> {
    connection.send(message).map_err(|_| DispatchError::Closed)
}

/// Sends to a single player, logging failures.
pub fn send_to(player: &Player, message: &ServerMessage) {
    let frame = match message.to_message() {
        Ok(frame) => frame,
        Err(e) => {
            error!("unable to encode {message:?}: {e}");
            return;
        }
    };
    deliver(player, frame);
}

/// Sends to every player in order, skipping `exclude`.
///
/// A failed delivery does not affect the other players.
pub fn broadcast(players: &[Player], message: &ServerMessage, exclude: Option<PlayerId>) {
    let frame = match message.to_message() {
        Ok(frame) => frame,
        Err(e) => {
            error!("unable to encode {message:?}: {e}");
            return;
        }
    };
    for player in players.iter().filter(|p| Some(p.id) != exclude) {
        deliver(player, frame.clone());
    }
}

fn deliver(player: &Player, frame: Message) {
    if let Err(e) = try_send(&player.connection, frame) {
        warn!(player_id = %player.id, "unable to send message to player: {e}");
    }
}
