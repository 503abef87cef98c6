use tokio::sync::mpsc::{channel, Sender};

use whiteboard_system::{ConnectionId, RoomId, SyncMessage};

use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::ServerState;

pub type ServerTx = Sender<ConnectionCommand>;

/// The single task owning all room state. The mpsc channel feeding it
/// is the serialization point: the order messages are accepted here is
/// the canonical order of every room.
struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx, room_id } => {
                let connection_id = self.server_state.join_room(&room_id);
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;

                // Fetch-on-join: the joiner reconciles from this frame.
                let full_state = self
                    .server_state
                    .rooms
                    .get(&room_id)
                    .map(|room| room.full_state());
                if let Some(full_state) = full_state {
                    self.connections
                        .send(&connection_id, ConnectionEvent::Outbound(full_state))
                        .await;
                }
            }
            ConnectionCommand::Disconnect { from } => {
                self.server_state.leave_room(&from);
                self.connections.remove(&from);
            }
            ConnectionCommand::Message { from, message } => {
                self.handle_sync_message(&from, message).await;
            }
        }
    }

    /// Mirrors the message into the room's history, then fans it out
    /// unchanged to every other member. No echo to the sender: the
    /// sender already applied the operation locally.
    async fn handle_sync_message(&mut self, from: &ConnectionId, message: SyncMessage) {
        let room_id = match self.server_state.room_of(from) {
            Some(room_id) => room_id.clone(),
            None => {
                log::warn!("Message from connection {} outside any room", from);
                return;
            }
        };
        if let Some(room) = self.server_state.rooms.get_mut(&room_id) {
            room.history.apply(&message);
        }
        self.broadcast(&room_id, message, Some(from)).await;
    }

    async fn broadcast(
        &mut self,
        room_id: &RoomId,
        message: SyncMessage,
        without: Option<&ConnectionId>,
    ) {
        for connection_id in self.server_state.connection_ids_in_room(room_id) {
            if Some(connection_id) != without {
                self.connections
                    .send(connection_id, ConnectionEvent::Outbound(message.clone()))
                    .await;
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command).await;
        }
    });

    srv_tx
}
