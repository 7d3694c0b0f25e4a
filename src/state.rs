use crate::actor::RoomHandle;
use crate::dispatch::{self, Connection};
use crate::error::GameError;
use crate::protocol::{RoomSummary, ServerMessage};
use crate::room::{Room, RoomId};
use crate::words::GameConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type SubscriberId = Uuid;

/// Every room of the process, by id.
#[derive(Default, Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    pub fn insert(&mut self, handle: RoomHandle) {
        self.rooms.insert(handle.summary().room_id, handle);
    }

    pub fn exists(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn get(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(id).cloned()
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms.values().map(|h| h.summary().clone()).collect()
    }
}

/// Connections that want to hear about new rooms.
#[derive(Default, Debug)]
pub struct RoomUpdates {
    subscribers: Vec<(SubscriberId, Connection)>,
}

impl RoomUpdates {
    pub fn subscribe(&mut self, connection: Connection) -> SubscriberId {
        let id = Uuid::new_v4();
        self.subscribers.push((id, connection));
        id
    }

    pub fn unsubscribe(&mut self, id: &SubscriberId) {
        self.subscribers.retain(|(subscriber, _)| subscriber != id);
    }

    pub fn count(&self) -> usize {
        self.subscribers.len()
    }

    /// Pushes a room announcement to every subscriber, dropping the ones
    /// whose connection is gone.
    pub fn announce(&mut self, room: &RoomSummary) {
        let frame = match ServerMessage::RoomCreated(room.clone()).to_message() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(room_id = %room.room_id, "unable to encode room announcement: {e}");
                return;
            }
        };
        self.subscribers.retain(|(id, connection)| {
            match dispatch::try_send(connection, frame.clone()) {
                Ok(()) => true,
                Err(e) => {
                    debug!(subscriber_id = %id, "dropping room subscriber: {e}");
                    false
                }
            }
        });
    }
}

#[derive(Default, Debug, Clone)]
pub struct ServerState {
    rooms: Arc<RwLock<RoomRegistry>>,
    room_updates: Arc<Mutex<RoomUpdates>>,
    config: Arc<GameConfig>,
}

impl ServerState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Default::default()
        }
    }

    /// Creates a room, starts its task and announces it to subscribers.
    pub fn create_room(&self, name: String) -> RoomSummary {
        // Holding the subscriber list across insert and announce means a
        // concurrent subscriber sees the new room exactly once.
        let mut updates = self.room_updates();
        let room = Room::new(Uuid::new_v4(), name, self.config.clone());
        let handle = RoomHandle::spawn(room);
        let summary = handle.summary().clone();
        self.rooms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle);
        info!(room_id = %summary.room_id, "room {} created", summary.room_name);
        updates.announce(&summary);
        summary
    }

    pub fn exists(&self, id: &RoomId) -> bool {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .exists(id)
    }

    pub fn room(&self, id: &RoomId) -> Result<RoomHandle, GameError> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .ok_or_else(|| GameError::RoomNotFound(id.to_string()))
    }

    pub fn rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .summaries()
    }

    /// Registers a subscriber and replays every existing room to it.
    pub fn subscribe(&self, connection: Connection) -> SubscriberId {
        let mut updates = self.room_updates();
        for room in self.rooms() {
            let Ok(frame) = ServerMessage::RoomCreated(room).to_message() else {
                continue;
            };
            if dispatch::try_send(&connection, frame).is_err() {
                break;
            }
        }
        let id = updates.subscribe(connection);
        debug!(subscriber_id = %id, "room subscriber added");
        id
    }

    pub fn unsubscribe(&self, id: &SubscriberId) {
        self.room_updates().unsubscribe(id);
        debug!(subscriber_id = %id, "room subscriber removed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.room_updates().count()
    }

    fn room_updates(&self) -> MutexGuard<'_, RoomUpdates> {
        self.room_updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
