use crate::history::HistoryStack;
use crate::message::{MalformedMessage, SyncMessage};
use crate::snapshot::Snapshot;
use crate::types::RoomId;

/// Connection lifecycle of one room membership. Every (re)entry to
/// `Active` goes through `Connecting` and reconciliation; there is no
/// shortcut from `Closed` or `Idle` back to `Active`, so a session can
/// never silently resume with stale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Active,
    Closing,
    Closed,
}

#[derive(Debug)]
pub enum SessionError {
    /// An edit intent arrived while the session isn't active. The
    /// embedding should prompt the user to join a room.
    NotConnected,
    /// The relay handshake failed; the session is back in `Closed` and
    /// the user must re-initiate.
    ConnectError { reason: String },
    /// A lifecycle call that isn't legal in the current state.
    InvalidTransition { from: ConnectionState },
    MalformedMessage(MalformedMessage),
}

/// Point-in-time room state obtained by an out-of-band fetch before
/// the first relay frame, when the embedding uses one.
#[derive(Debug)]
pub struct FetchedState {
    pub undo: Vec<Snapshot>,
    pub redo: Vec<Snapshot>,
}

/// What one engine step asks of the embedding: re-render from
/// `render` if set, and send `outbound` to the relay if set. Rendering
/// and transport stay outside the engine.
#[derive(Debug)]
pub struct StateUpdate {
    pub render: Option<Snapshot>,
    pub outbound: Option<SyncMessage>,
}

impl StateUpdate {
    fn none() -> Self {
        Self {
            render: None,
            outbound: None,
        }
    }
}

/// This client's membership in one room: the lifecycle state machine,
/// the locally authoritative history copy, and the rules turning local
/// intents into outbound messages and inbound messages into local
/// state.
pub struct RoomSession {
    room_id: Option<RoomId>,
    state: ConnectionState,
    history: HistoryStack,
}

impl RoomSession {
    pub fn new() -> Self {
        Self {
            room_id: None,
            state: ConnectionState::Idle,
            history: HistoryStack::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    /// For gating controls: undo/redo availability and the like.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn current_render(&self) -> Option<&Snapshot> {
        self.history.top()
    }

    /// Starts joining a room. Reconnects re-enter here as well.
    pub fn connect(&mut self, room_id: RoomId) -> Result<(), SessionError> {
        match self.state {
            ConnectionState::Idle | ConnectionState::Closed => {
                log::info!("Connecting to room {}", room_id);
                self.room_id = Some(room_id);
                self.state = ConnectionState::Connecting;
                Ok(())
            }
            from => Err(SessionError::InvalidTransition { from }),
        }
    }

    /// The transport handshake succeeded. If the embedding fetched the
    /// room state out of band, reconciliation runs now; otherwise it
    /// runs on the relay's join-time `full_state` frame.
    pub fn handshake_success(
        &mut self,
        fetched: Option<FetchedState>,
    ) -> Result<StateUpdate, SessionError> {
        match self.state {
            ConnectionState::Connecting => {
                self.state = ConnectionState::Active;
                log::info!("Joined room {:?}", self.room_id);
                match fetched {
                    Some(state) => Ok(self.reconcile(state.undo, state.redo)),
                    None => Ok(StateUpdate::none()),
                }
            }
            from => Err(SessionError::InvalidTransition { from }),
        }
    }

    /// The transport handshake failed. Returns the error for the
    /// embedding to surface; there is no automatic retry.
    pub fn handshake_failure(&mut self, reason: &str) -> SessionError {
        log::warn!("Handshake with relay failed: {}", reason);
        self.close();
        SessionError::ConnectError {
            reason: reason.into(),
        }
    }

    /// User-initiated leave. The outbound close is fire-and-forget, so
    /// `Closing` resolves to `Closed` immediately.
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        match self.state {
            ConnectionState::Active => {
                self.state = ConnectionState::Closing;
                log::info!("Leaving room {:?}", self.room_id);
                self.close();
                Ok(())
            }
            from => Err(SessionError::InvalidTransition { from }),
        }
    }

    /// Transport-initiated close. Clean and unclean closes end in the
    /// same local state; they differ only in what gets logged.
    pub fn connection_closed(&mut self, clean: bool) {
        if clean {
            log::info!("Connection to room {:?} closed cleanly", self.room_id);
        } else {
            log::warn!("Connection to room {:?} dropped", self.room_id);
        }
        self.close();
    }

    /// Commits a locally rendered edit: pushes the snapshot, discarding
    /// any redo entries, and hands back the message to broadcast.
    pub fn commit(&mut self, snapshot: Snapshot) -> Result<StateUpdate, SessionError> {
        self.require_active()?;
        self.history.push(snapshot.clone());
        Ok(StateUpdate {
            render: Some(snapshot.clone()),
            outbound: Some(SyncMessage::Commit { snapshot }),
        })
    }

    /// Local-first undo. When there is nothing to undo past, the intent
    /// is inert: no state change and no network send.
    pub fn undo(&mut self) -> Result<StateUpdate, SessionError> {
        self.require_active()?;
        match self.history.undo() {
            Ok(render) => Ok(StateUpdate {
                render: Some(render),
                outbound: Some(SyncMessage::Undo),
            }),
            Err(_) => Ok(StateUpdate::none()),
        }
    }

    /// Local-first redo; inert when nothing has been undone.
    pub fn redo(&mut self) -> Result<StateUpdate, SessionError> {
        self.require_active()?;
        match self.history.redo() {
            Ok(render) => Ok(StateUpdate {
                render: Some(render),
                outbound: Some(SyncMessage::Redo),
            }),
            Err(_) => Ok(StateUpdate::none()),
        }
    }

    pub fn clear(&mut self) -> Result<StateUpdate, SessionError> {
        self.require_active()?;
        let blank = self.history.clear();
        Ok(StateUpdate {
            render: Some(blank),
            outbound: Some(SyncMessage::Clear),
        })
    }

    /// Decodes and applies one inbound frame. A malformed frame is
    /// reported and dropped; local state is never partially updated.
    pub fn handle_text(&mut self, text: &str) -> Result<StateUpdate, SessionError> {
        match SyncMessage::parse(text) {
            Ok(message) => self.handle_message(message),
            Err(malformed) => {
                log::warn!("Dropping malformed frame: {}", malformed.reason);
                Err(SessionError::MalformedMessage(malformed))
            }
        }
    }

    /// Applies one inbound message. Whatever the relay delivers
    /// supersedes local state, in delivery order, including the results
    /// of this client's own earlier actions.
    pub fn handle_message(&mut self, message: SyncMessage) -> Result<StateUpdate, SessionError> {
        if self.state != ConnectionState::Active {
            log::warn!("Ignoring message while {:?}: {:?}", self.state, message);
            return Ok(StateUpdate::none());
        }
        match message {
            SyncMessage::Commit { snapshot } => {
                self.history.push(snapshot.clone());
                Ok(StateUpdate {
                    render: Some(snapshot),
                    outbound: None,
                })
            }
            SyncMessage::Undo => {
                let render = match self.history.undo() {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        log::warn!("Remote undo had nothing to apply: {:?}", err);
                        None
                    }
                };
                Ok(StateUpdate {
                    render,
                    outbound: None,
                })
            }
            SyncMessage::Redo => {
                let render = match self.history.redo() {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        log::warn!("Remote redo had nothing to apply: {:?}", err);
                        None
                    }
                };
                Ok(StateUpdate {
                    render,
                    outbound: None,
                })
            }
            SyncMessage::Clear => Ok(StateUpdate {
                render: Some(self.history.clear()),
                outbound: None,
            }),
            SyncMessage::FullState { undo, redo } => Ok(self.reconcile(undo, redo)),
        }
    }

    /// Replaces local history wholesale with the room's authoritative
    /// state and names the new render target. A room nobody has ever
    /// committed to is seeded with a single blank snapshot, and the
    /// seed is committed so every later joiner fetches a non-empty
    /// history. Running this twice from the same fetched state
    /// converges to the same render target without duplicating entries.
    fn reconcile(&mut self, undo: Vec<Snapshot>, redo: Vec<Snapshot>) -> StateUpdate {
        self.history.replace(undo, redo);
        match self.history.top() {
            Some(top) => StateUpdate {
                render: Some(top.clone()),
                outbound: None,
            },
            None => {
                log::info!("Room {:?} has no history yet; seeding a blank canvas", self.room_id);
                let blank = Snapshot::blank();
                self.history.push(blank.clone());
                StateUpdate {
                    render: Some(blank.clone()),
                    outbound: Some(SyncMessage::Commit { snapshot: blank }),
                }
            }
        }
    }

    fn close(&mut self) {
        self.state = ConnectionState::Closed;
        self.history.reset();
    }

    fn require_active(&self) -> Result<(), SessionError> {
        if self.state == ConnectionState::Active {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }
}

impl Default for RoomSession {
    fn default() -> Self {
        Self::new()
    }
}
