use crate::error::CoreError;
use crate::model::ContentItem;
use crate::queue::ItemsByChannel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A channel id resolved from user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChannel {
    pub channel_id: String,
    /// Display name reported by the catalog, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ResolvedChannel {
    #[must_use]
    pub fn new(channel_id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            label,
        }
    }
}

/// Result of fetching recent items for a set of channels.
///
/// A channel that failed on its own maps to an empty list and contributes one
/// message to `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItems {
    #[serde(rename = "videosByChannel", default)]
    pub items_by_channel: ItemsByChannel,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RecentItems {
    /// Per-channel failures joined for display, if there were any.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        (!self.errors.is_empty()).then(|| self.errors.join(" | "))
    }
}

/// Trait for video catalog backends
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Get the catalog name
    fn name(&self) -> &'static str;

    /// Resolve free-form channel input (URL, handle, id or name) to a channel id.
    async fn resolve_channel(&self, raw: &str) -> Result<ResolvedChannel, CoreError>;

    /// Resolve a video URL or id to a playable item.
    async fn resolve_video(&self, raw: &str) -> Result<ContentItem, CoreError>;

    /// Fetch the most recent items of every channel.
    ///
    /// `Err` means the whole request failed; per-channel failures are
    /// reported inside [`RecentItems`].
    async fn fetch_recent_items(&self, channel_ids: &[String]) -> Result<RecentItems, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_items_wire_format() {
        let json = r#"{
            "videosByChannel": {
                "UC1": [{"id":"v1","title":"T","channelId":"UC1","channelTitle":"C","thumbnail":""}]
            },
            "errors": ["Failed to fetch videos for channel UC2: boom"]
        }"#;
        let recent: RecentItems = serde_json::from_str(json).unwrap();
        assert_eq!(recent.items_by_channel["UC1"][0].id, "v1");
        assert_eq!(
            recent.error_summary().as_deref(),
            Some("Failed to fetch videos for channel UC2: boom")
        );
    }

    #[test]
    fn test_error_summary_joins_messages() {
        let recent = RecentItems {
            items_by_channel: ItemsByChannel::new(),
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(recent.error_summary().as_deref(), Some("a | b"));
        assert_eq!(RecentItems::default().error_summary(), None);
    }

    #[test]
    fn test_resolved_channel_omits_missing_label() {
        let json = serde_json::to_string(&ResolvedChannel::new("UC1", None)).unwrap();
        assert_eq!(json, r#"{"channelId":"UC1"}"#);
    }
}
