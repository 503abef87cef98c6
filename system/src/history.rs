use std::collections::VecDeque;

use crate::message::SyncMessage;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Nothing left to undo past; the oldest snapshot always stays.
    EmptyHistory,
    NoRedoAvailable,
}

/// The undo/redo sequences of one room as held by one member.
///
/// `undo` is oldest-first and its last element is exactly what is on
/// screen. `redo` is most-recently-undone-first, populated only by
/// `undo` and invalidated by any new push.
#[derive(Debug, Default)]
pub struct HistoryStack {
    undo: Vec<Snapshot>,
    redo: VecDeque<Snapshot>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: VecDeque::new(),
        }
    }

    /// Appends a committed snapshot. Always succeeds; any pending redo
    /// entries are discarded, never merged.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        self.redo.clear();
    }

    /// Steps back one snapshot and returns the new render target.
    pub fn undo(&mut self) -> Result<Snapshot, HistoryError> {
        if self.undo.len() <= 1 {
            return Err(HistoryError::EmptyHistory);
        }
        let undone = self.undo.pop().expect("undo has at least two entries");
        self.redo.push_front(undone);
        Ok(self.undo[self.undo.len() - 1].clone())
    }

    /// Reinstates the most recently undone snapshot and returns it.
    pub fn redo(&mut self) -> Result<Snapshot, HistoryError> {
        match self.redo.pop_front() {
            Some(snapshot) => {
                self.undo.push(snapshot.clone());
                Ok(snapshot)
            }
            None => Err(HistoryError::NoRedoAvailable),
        }
    }

    /// Replaces all history with a single fresh blank snapshot and
    /// returns it.
    pub fn clear(&mut self) -> Snapshot {
        let blank = Snapshot::blank();
        self.undo = vec![blank.clone()];
        self.redo.clear();
        blank
    }

    /// The current render target, or `None` before initialization.
    pub fn top(&self) -> Option<&Snapshot> {
        self.undo.last()
    }

    /// Wholesale replacement with an authoritative state.
    pub fn replace(&mut self, undo: Vec<Snapshot>, redo: Vec<Snapshot>) {
        self.undo = undo;
        self.redo = redo.into();
    }

    /// Empties both sequences. Used on session teardown.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// The full-state message describing this stack.
    pub fn to_full_state(&self) -> SyncMessage {
        SyncMessage::FullState {
            undo: self.undo.clone(),
            redo: self.redo.iter().cloned().collect(),
        }
    }

    /// The one inbound application rule shared by every mirror of a
    /// room's history. Undo/redo with nothing to pop are no-ops rather
    /// than errors, so all members process the same message sequence
    /// without diverging.
    pub fn apply(&mut self, message: &SyncMessage) {
        match message {
            SyncMessage::Commit { snapshot } => self.push(snapshot.clone()),
            SyncMessage::Undo => {
                let _ = self.undo();
            }
            SyncMessage::Redo => {
                let _ = self.redo();
            }
            SyncMessage::Clear => {
                self.clear();
            }
            SyncMessage::FullState { undo, redo } => self.replace(undo.clone(), redo.clone()),
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(label: &str) -> Snapshot {
        Snapshot::new(format!("data:image/png;base64,{}", label))
    }

    #[test]
    fn it_grows_undo_and_empties_redo_on_every_push() {
        let mut stack = HistoryStack::new();
        for i in 0..4 {
            stack.push(snapshot("s"));
            assert_eq!(stack.undo_len(), i + 1);
            assert_eq!(stack.redo_len(), 0);
        }
    }

    #[test]
    fn it_never_undoes_past_the_oldest_snapshot() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("first"));
        assert_eq!(stack.undo(), Err(HistoryError::EmptyHistory));
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.redo_len(), 0);
    }

    #[test]
    fn it_rejects_redo_with_nothing_undone() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("first"));
        assert_eq!(stack.redo(), Err(HistoryError::NoRedoAvailable));
        assert_eq!(stack.undo_len(), 1);
    }

    #[test]
    fn it_restores_the_same_entity_on_undo_then_redo() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("first"));
        let second = snapshot("second");
        stack.push(second.clone());

        let render_after_undo = stack.undo().unwrap();
        assert_ne!(render_after_undo, second);

        let restored = stack.redo().unwrap();
        assert_eq!(restored, second);
        assert_eq!(stack.top(), Some(&second));
    }

    #[test]
    fn it_discards_pending_redo_on_a_new_commit() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("a"));
        stack.push(snapshot("b"));
        stack.push(snapshot("c"));
        stack.undo().unwrap();
        stack.undo().unwrap();
        assert_eq!(stack.redo_len(), 2);

        stack.push(snapshot("d"));
        assert_eq!(stack.redo_len(), 0);
        assert_eq!(stack.redo(), Err(HistoryError::NoRedoAvailable));
    }

    #[test]
    fn it_clears_to_a_single_blank_snapshot() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("a"));
        stack.push(snapshot("b"));
        stack.undo().unwrap();

        let blank = stack.clear();
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.redo_len(), 0);
        assert_eq!(stack.top(), Some(&blank));
    }

    #[test]
    fn it_mirrors_a_message_sequence_identically() {
        let committed = snapshot("stroke");
        let sequence = vec![
            SyncMessage::Commit {
                snapshot: snapshot("seed"),
            },
            SyncMessage::Commit {
                snapshot: committed.clone(),
            },
            SyncMessage::Undo,
            SyncMessage::Redo,
        ];

        let mut first = HistoryStack::new();
        let mut second = HistoryStack::new();
        for message in &sequence {
            first.apply(message);
            second.apply(message);
        }
        assert_eq!(first.undo_len(), 2);
        assert_eq!(first.undo_len(), second.undo_len());
        assert_eq!(first.redo_len(), second.redo_len());
        assert_eq!(first.top(), Some(&committed));
        assert_eq!(first.top(), second.top());
    }

    #[test]
    fn it_ignores_inapplicable_remote_undo() {
        let mut stack = HistoryStack::new();
        stack.push(snapshot("only"));
        stack.apply(&SyncMessage::Undo);
        assert_eq!(stack.undo_len(), 1);
    }
}
