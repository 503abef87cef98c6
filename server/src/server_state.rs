use std::collections::HashMap;
use std::num::Wrapping;

use whiteboard_system::{ConnectionId, RoomId};

use crate::room::Room;

pub struct ServerState {
    connection_id_source: Wrapping<ConnectionId>,
    pub connection_locations: HashMap<ConnectionId, RoomId>,
    pub rooms: HashMap<RoomId, Room>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_locations: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    /// Joins the room, creating it on first join. A new room's history
    /// starts empty; the first joiner seeds it with a blank commit.
    pub fn join_room(&mut self, room_id: &RoomId) -> ConnectionId {
        let connection_id = self.new_connection_id();
        let room = self.rooms.entry(room_id.clone()).or_insert_with(Room::new);
        room.connections.push(connection_id);
        self.connection_locations
            .insert(connection_id, room_id.clone());
        log::info!("Connection {} joined room {}", connection_id, room_id);
        connection_id
    }

    /// Removes the connection from its room. The room itself is kept
    /// even when empty: its history must survive so a rejoining member
    /// can fetch the last committed state.
    pub fn leave_room(&mut self, connection_id: &ConnectionId) -> Option<RoomId> {
        let room_id = self.connection_locations.remove(connection_id)?;
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.connections.retain(|c| c != connection_id);
        }
        log::info!("Connection {} left room {}", connection_id, room_id);
        Some(room_id)
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.connection_locations.get(connection_id)
    }

    pub fn connection_ids_in_room(&self, room_id: &RoomId) -> &[ConnectionId] {
        self.rooms
            .get(room_id)
            .map(|room| room.connections.as_slice())
            .unwrap_or(&[])
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}
