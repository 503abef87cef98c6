mod history;
mod message;
mod room_session;
mod snapshot;
mod types;

pub use history::{HistoryError, HistoryStack};
pub use message::{MalformedMessage, SyncMessage};
pub use room_session::{ConnectionState, FetchedState, RoomSession, SessionError, StateUpdate};
pub use snapshot::Snapshot;
pub use types::*;
