//! Per-connection tasks.
//!
//! Every socket is split in two: a writer task drains the connection's
//! outbound queue into the sink, and a reader loop feeds inbound frames to
//! the room. Whichever finishes first ends the session, and the player is
//! removed from the room exactly once afterwards.

use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitStream, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::actor::RoomHandle;
use crate::dispatch;
use crate::protocol::ClientMessage;
use crate::room::PlayerId;
use crate::state::ServerState;

/// Serves a player connected to `room` until the socket closes.
pub async fn player_session(socket: WebSocket, room: RoomHandle, name: String, is_admin: bool) {
    let room_id = room.summary().room_id;
    let (sink, stream) = socket.split();
    let (connection, outbound) = dispatch::connection();
    let mut writer = tokio::spawn(write_loop(outbound, sink));

    let player = match room.join(name, is_admin, connection).await {
        Ok(player) => player,
        Err(e) => {
            warn!(%room_id, "unable to join room: {e}");
            writer.abort();
            return;
        }
    };
    let player_id = player.player_id;

    let mut reader = tokio::spawn(read_loop(stream, room.clone(), player_id));

    tokio::select! {
        _ = &mut writer => { reader.abort(); }
        _ = &mut reader => { writer.abort(); }
    }

    info!(%room_id, %player_id, "player connection closed");
    if let Err(e) = room.leave(player_id) {
        warn!(%room_id, %player_id, "unable to remove player: {e}");
    }
}

/// Streams room announcements to a subscriber until the socket closes.
pub async fn room_updates_session(socket: WebSocket, state: ServerState) {
    let (sink, mut stream) = socket.split();
    let (connection, outbound) = dispatch::connection();
    let mut writer = tokio::spawn(write_loop(outbound, sink));
    let subscriber_id = state.subscribe(connection);

    // Subscribers have nothing to say; reading only detects the close.
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if let Message::Close(_) = frame {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut writer => { reader.abort(); }
        _ = &mut reader => { writer.abort(); }
    }

    state.unsubscribe(&subscriber_id);
}

async fn write_loop<S>(outbound: UnboundedReceiver<Message>, sink: S)
where
    S: futures::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    if let Err(e) = UnboundedReceiverStream::new(outbound)
        .map(Ok)
        .forward(sink)
        .await
    {
        debug!("connection write failed: {e}");
    }
}

async fn read_loop(mut stream: SplitStream<WebSocket>, room: RoomHandle, player_id: PlayerId) {
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%player_id, "unable to read message from player: {e}");
                break;
            }
        };
        match frame {
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => continue,
            frame => match ClientMessage::decode(&frame) {
                Ok(message) => {
                    debug!(%player_id, "received {}", message.kind());
                    if room.dispatch(player_id, message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!(%player_id, "dropping message: {e}"),
            },
        }
    }
}
