use whiteboard_system::{ConnectionId, HistoryStack, SyncMessage};

/// One room as the relay sees it: the member connections and the
/// authoritative mirror of the room's history, built by applying every
/// accepted message in acceptance order.
pub struct Room {
    pub connections: Vec<ConnectionId>,
    pub history: HistoryStack,
}

impl Room {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            history: HistoryStack::new(),
        }
    }

    /// The join-time fetch payload.
    pub fn full_state(&self) -> SyncMessage {
        self.history.to_full_state()
    }
}
