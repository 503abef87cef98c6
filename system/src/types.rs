/// Rooms are path-addressed by the relay, so the identifier is an
/// opaque string.
pub type RoomId = String;

pub type ConnectionId = u16;
