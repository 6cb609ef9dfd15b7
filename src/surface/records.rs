//! Wire records returned by the entity-search surface.
//!
//! Every inbound record is a tagged, serde-validated structure with
//! explicit defaulting - field presence is never trusted. Records that
//! lack the minimum usable shape are skipped by the strategies, never
//! treated as fatal.

use serde::{Deserialize, Serialize};

/// A minimally-normalized external entity record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEntity {
    /// Platform-assigned identifier, as the surface reported it.
    pub id: Option<String>,
    pub title: Option<String>,
    /// Public handle, without the `@` prefix.
    pub handle: Option<String>,
    /// Platform flag: `true` for broadcast channels, `false` for groups.
    pub broadcast: bool,
    pub participant_count: Option<u64>,
    pub about: Option<String>,
    pub verified: bool,
}

impl RawEntity {
    /// Whether this record carries enough to become a candidate.
    pub fn is_usable(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
            && self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// One content item from an entity's recent history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMessage {
    pub id: u64,
    /// Identifier of the owning entity, for back-resolution.
    pub peer_id: Option<String>,
    pub text: Option<String>,
    /// Unix timestamp in seconds.
    pub date: Option<i64>,
    pub views: Option<u64>,
    pub reactions: Option<u64>,
    pub has_media: bool,
    pub is_forward: bool,
}

/// A page of message-search results with the entities they reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePage {
    pub messages: Vec<RawMessage>,
    pub entities: Vec<RawEntity>,
}
