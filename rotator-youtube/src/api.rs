//! Response shapes of the YouTube Data API v3, reduced to the fields we read.
//! Every field is optional; serde ignores the rest.

use rotator_core::ContentItem;
use serde::Deserialize;

/// Title used when the API omits one
pub const UNTITLED_VIDEO: &str = "Untitled video";
/// Channel title used when the API omits one
pub const UNKNOWN_CHANNEL: &str = "Channel";

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Item of `channels` and `videos` list responses
#[derive(Debug, Deserialize)]
pub struct Resource {
    pub id: Option<String>,
    pub snippet: Option<Snippet>,
}

/// Item of `search` responses
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: Option<SearchResultId>,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

impl Snippet {
    /// Best available thumbnail: `high`, then `default`, else empty.
    fn thumbnail_url(&self) -> String {
        self.thumbnails
            .as_ref()
            .and_then(|t| {
                t.high
                    .as_ref()
                    .and_then(|h| h.url.clone())
                    .or_else(|| t.default.as_ref().and_then(|d| d.url.clone()))
            })
            .unwrap_or_default()
    }

    /// Build a content item, filling gaps with fallbacks.
    pub fn into_item(self, video_id: String, fallback_channel_id: &str) -> ContentItem {
        let thumbnail_url = self.thumbnail_url();
        ContentItem {
            id: video_id,
            title: self.title.unwrap_or_else(|| UNTITLED_VIDEO.to_string()),
            channel_id: self
                .channel_id
                .unwrap_or_else(|| fallback_channel_id.to_string()),
            channel_title: self
                .channel_title
                .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            thumbnail_url,
        }
    }
}

impl SearchResult {
    /// Convert a video search hit. Hits without a video id are dropped.
    pub fn into_video(self, requested_channel_id: &str) -> Option<ContentItem> {
        let video_id = self.id.and_then(|id| id.video_id)?;
        Some(
            self.snippet
                .unwrap_or_default()
                .into_item(video_id, requested_channel_id),
        )
    }
}
