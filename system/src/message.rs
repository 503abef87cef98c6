use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// An inbound frame that couldn't be decoded. Reported and dropped;
/// never partially applied.
#[derive(Debug)]
pub struct MalformedMessage {
    pub reason: String,
}

/// The wire vocabulary. Each message is a single JSON object whose
/// `action` field names the operation:
///
/// `{"action":"commit","snapshot":"<encoded image>"}`
/// `{"action":"undo"}` / `{"action":"redo"}` / `{"action":"clear"}`
/// `{"action":"full_state","undo":[...],"redo":[...]}`
///
/// Members send only the discrete forms; `full_state` flows from the
/// relay to a (re)joining member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncMessage {
    Commit {
        snapshot: Snapshot,
    },
    Undo,
    Redo,
    Clear,
    FullState {
        undo: Vec<Snapshot>,
        redo: Vec<Snapshot>,
    },
}

impl SyncMessage {
    pub fn parse(text: &str) -> Result<Self, MalformedMessage> {
        serde_json::from_str(text).map_err(|err| MalformedMessage {
            reason: err.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("sync messages always serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_discrete_actions_with_a_discriminator() {
        assert_eq!(SyncMessage::Undo.encode(), r#"{"action":"undo"}"#);
        assert_eq!(SyncMessage::Redo.encode(), r#"{"action":"redo"}"#);
        assert_eq!(SyncMessage::Clear.encode(), r#"{"action":"clear"}"#);
    }

    #[test]
    fn it_round_trips_a_commit() {
        let message = SyncMessage::Commit {
            snapshot: Snapshot::new("data:image/png;base64,abc".into()),
        };
        let wire = message.encode();
        assert_eq!(wire, r#"{"action":"commit","snapshot":"data:image/png;base64,abc"}"#);

        match SyncMessage::parse(&wire).unwrap() {
            SyncMessage::Commit { snapshot } => {
                assert_eq!(snapshot.image(), "data:image/png;base64,abc")
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn it_round_trips_a_full_state() {
        let wire = r#"{"action":"full_state","undo":["a","b"],"redo":["c"]}"#;
        match SyncMessage::parse(wire).unwrap() {
            SyncMessage::FullState { undo, redo } => {
                assert_eq!(undo.len(), 2);
                assert_eq!(redo.len(), 1);
                assert_eq!(undo[1].image(), "b");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn it_rejects_a_frame_without_a_discriminator() {
        assert!(SyncMessage::parse("{}").is_err());
        assert!(SyncMessage::parse("not json").is_err());
    }

    #[test]
    fn it_rejects_a_commit_without_a_payload() {
        assert!(SyncMessage::parse(r#"{"action":"commit"}"#).is_err());
    }
}
