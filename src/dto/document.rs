use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque scoreboard state for one channel.
///
/// The server round-trips whatever fields the control panel sends between
/// storage, memory, and the wire; nothing is validated or interpreted, and
/// clients are free to add or remove fields. Field order is preserved so the
/// persisted files stay stable across rewrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelDocument(pub Map<String, Value>);

impl ChannelDocument {
    /// Fixed fallback document substituted when a channel has no readable
    /// state on disk.
    pub fn default_board() -> Self {
        let mut map = Map::new();
        map.insert("p1Flag".into(), Value::from("fr"));
        map.insert("p1Ranking".into(), Value::from("#1"));
        map.insert("p1Name".into(), Value::from("Player 1"));
        map.insert("p2Flag".into(), Value::from("rn"));
        map.insert("p2Ranking".into(), Value::from("#2"));
        map.insert("p2Name".into(), Value::from("Player 2"));
        map.insert("p1Score".into(), Value::from(0));
        map.insert("p2Score".into(), Value::from(0));
        map.insert("round".into(), Value::from("Winners Round 1"));
        Self(map)
    }
}
