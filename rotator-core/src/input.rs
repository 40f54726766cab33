//! Parsing of free-form user input (URLs, handles, ids) into catalog queries.
//!
//! Nothing here touches the network: the catalog client turns a
//! [`ChannelQuery`] into a concrete lookup.

use url::Url;

/// Length of a catalog video id
const VIDEO_ID_LEN: usize = 11;

/// Prefix shared by canonical channel ids
const CHANNEL_ID_PREFIX: &str = "UC";

/// What a piece of channel input refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelQuery {
    /// A canonical channel id (`UC...`)
    Id(String),
    /// A legacy username (`/user/<name>`)
    Username(String),
    /// An `@handle`, without the leading `@`
    Handle(String),
    /// Anything else, resolved by free-text channel search
    Search(String),
}

/// Classify channel input.
///
/// Returns `None` for blank input.
#[must_use]
pub fn parse_channel_input(raw: &str) -> Option<ChannelQuery> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(cleaned) {
        if let Some(query) = channel_query_from_path(url.path()) {
            return Some(query);
        }
    }

    if let Some(handle) = cleaned.strip_prefix('@') {
        return Some(ChannelQuery::Handle(handle.to_string()));
    }

    if cleaned.starts_with(CHANNEL_ID_PREFIX) {
        return Some(ChannelQuery::Id(cleaned.to_string()));
    }

    Some(ChannelQuery::Search(cleaned.to_string()))
}

fn channel_query_from_path(path: &str) -> Option<ChannelQuery> {
    if let Some(id) = segment_after(path, "/channel/") {
        return Some(ChannelQuery::Id(id));
    }
    if let Some(username) = segment_after(path, "/user/") {
        return Some(ChannelQuery::Username(username));
    }
    if let Some(custom) = segment_after(path, "/c/") {
        return Some(ChannelQuery::Search(custom));
    }

    let (_, after_at) = path.split_once('@')?;
    let handle = after_at.split('/').next().unwrap_or_default();
    (!handle.is_empty()).then(|| ChannelQuery::Handle(handle.to_string()))
}

/// First non-empty path segment following `marker`.
fn segment_after(path: &str, marker: &str) -> Option<String> {
    let (_, rest) = path.split_once(marker)?;
    let segment = rest.split('/').next().unwrap_or_default();
    (!segment.is_empty()).then(|| segment.to_string())
}

/// Extract a video id from a watch URL, short link, shorts URL or bare id.
///
/// Returns an empty string when nothing usable is present.
#[must_use]
pub fn extract_video_id(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    let Ok(url) = Url::parse(cleaned) else {
        return cleaned.to_string();
    };

    if let Some((_, v)) = url
        .query_pairs()
        .find(|(key, value)| key.as_ref() == "v" && !value.is_empty())
    {
        return v.into_owned();
    }

    let path = url.path();
    if let Some(rest) = path.strip_prefix("/shorts/") {
        return rest.split('/').next().unwrap_or_default().to_string();
    }

    path.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Heuristic deciding whether input names a single video rather than a channel.
#[must_use]
pub fn is_likely_video_input(raw: &str) -> bool {
    let video_id = extract_video_id(raw);
    if video_id.is_empty() || video_id.starts_with(CHANNEL_ID_PREFIX) {
        return false;
    }

    let lowered = raw.to_ascii_lowercase();
    let looks_like_url = lowered.contains("youtu.be") || lowered.contains("youtube.com");
    let has_video_hints = lowered.contains("v=") || lowered.contains("shorts/");
    let looks_like_id = video_id.chars().count() == VIDEO_ID_LEN;

    (looks_like_url && has_video_hints) || looks_like_id
}
