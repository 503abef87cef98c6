use serde::{Deserialize, Serialize};

/// 1x1 transparent PNG. Seeds a room before anyone has drawn, and
/// backs `clear`.
const BLANK_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// One immutable encoded image of the canvas at a point in history.
///
/// Equality is entity identity, never pixel content: two snapshots of
/// the same drawing are still distinct history entries. On the wire a
/// snapshot is just its self-contained image string; deserializing
/// mints a fresh identity on the receiving side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Snapshot {
    id: uuid::Uuid,
    image: String,
}

impl Snapshot {
    pub fn new(image: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            image,
        }
    }

    pub fn blank() -> Self {
        Self::new(BLANK_IMAGE.into())
    }

    /// The encoded image, decodable without external context.
    pub fn image(&self) -> &str {
        &self.image
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Snapshot {}

impl From<String> for Snapshot {
    fn from(image: String) -> Self {
        Self::new(image)
    }
}

impl From<Snapshot> for String {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_distinguishes_snapshots_with_identical_content() {
        let a = Snapshot::new("data:image/png;base64,xyz".into());
        let b = Snapshot::new("data:image/png;base64,xyz".into());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn it_serializes_as_the_bare_image_string() {
        let snapshot = Snapshot::new("data:image/png;base64,xyz".into());
        let wire = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(wire, "\"data:image/png;base64,xyz\"");

        let received: Snapshot = serde_json::from_str(&wire).unwrap();
        assert_eq!(received.image(), snapshot.image());
        // A received snapshot is a new entity.
        assert_ne!(received, snapshot);
    }
}
