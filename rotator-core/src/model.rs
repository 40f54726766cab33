//! Channels and content items shared by every layer.

use serde::{Deserialize, Serialize};

/// A configured video source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Canonical catalog identifier
    pub id: String,
    /// Display label
    pub label: String,
}

impl Channel {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Whether this channel has the given id, ignoring ASCII case.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}

/// A playable video fetched from the catalog.
///
/// Serialized with the catalog proxy's field names (`channelId`, `thumbnail`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
}

impl ContentItem {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        channel_id: impl Into<String>,
        channel_title: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_id: channel_id.into(),
            channel_title: channel_title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }

    /// Identity check: two items are the same video iff their ids match,
    /// ignoring ASCII case.
    #[must_use]
    pub fn same_id(&self, other_id: &str) -> bool {
        self.id.eq_ignore_ascii_case(other_id)
    }
}
