//! The user's editable lists: channels, pinned items and interstitials.

use crate::catalog::ResolvedChannel;
use crate::error::{CoreError, Result};
use crate::input::extract_video_id;
use crate::model::{Channel, ContentItem};
use crate::store::PersistedState;

pub const DUPLICATE_CHANNEL_MESSAGE: &str = "That channel is already in the list.";
pub const DUPLICATE_MANUAL_MESSAGE: &str = "That video is already pinned to the queue.";
pub const DUPLICATE_INTERSTITIAL_MESSAGE: &str = "That interstitial is already in the list.";
pub const MISSING_INTERSTITIAL_MESSAGE: &str = "Enter a video link or id for the interstitial.";

/// Channels, pinned items and interstitial ids, with their uniqueness rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub channels: Vec<Channel>,
    /// Most recently pinned first
    pub manual_queue: Vec<ContentItem>,
    /// Rotation order
    pub interstitials: Vec<String>,
}

impl Library {
    #[must_use]
    pub fn from_persisted(state: &PersistedState) -> Self {
        Self {
            channels: state.channels.clone(),
            manual_queue: state.manual_queue.clone(),
            interstitials: state.interstitials.clone(),
        }
    }

    #[must_use]
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.id.clone()).collect()
    }

    /// Append a resolved channel.
    ///
    /// The label is the explicit one when non-blank, else the catalog's,
    /// else `Channel <n>` where `n` is the new list length.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rejected`] if the channel id is already present.
    pub fn add_channel(&mut self, resolved: ResolvedChannel, label: Option<&str>) -> Result<&Channel> {
        if self.channels.iter().any(|c| c.has_id(&resolved.channel_id)) {
            return Err(CoreError::rejected(DUPLICATE_CHANNEL_MESSAGE));
        }

        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .or(resolved.label.filter(|l| !l.trim().is_empty()))
            .unwrap_or_else(|| format!("Channel {}", self.channels.len() + 1));

        self.channels.push(Channel::new(resolved.channel_id, label));
        Ok(&self.channels[self.channels.len() - 1])
    }

    /// Remove the channel with exactly this id. Returns whether anything changed.
    pub fn remove_channel(&mut self, id: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|c| c.id != id);
        self.channels.len() != before
    }

    /// Pin an item at the head of the manual queue.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rejected`] if an item with the same id is already pinned.
    pub fn add_manual_item(&mut self, item: ContentItem) -> Result<()> {
        if self.manual_queue.iter().any(|m| m.same_id(&item.id)) {
            return Err(CoreError::rejected(DUPLICATE_MANUAL_MESSAGE));
        }
        self.manual_queue.insert(0, item);
        Ok(())
    }

    /// Unpin the item with exactly this id. Returns whether anything changed.
    pub fn remove_manual_item(&mut self, id: &str) -> bool {
        let before = self.manual_queue.len();
        self.manual_queue.retain(|m| m.id != id);
        self.manual_queue.len() != before
    }

    /// Append an interstitial given as a link or bare id. Returns the stored id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rejected`] if no id can be extracted or the id is
    /// already in the list (exact match).
    pub fn add_interstitial(&mut self, raw: &str) -> Result<String> {
        let id = extract_video_id(raw);
        if id.is_empty() {
            return Err(CoreError::rejected(MISSING_INTERSTITIAL_MESSAGE));
        }
        if self.interstitials.contains(&id) {
            return Err(CoreError::rejected(DUPLICATE_INTERSTITIAL_MESSAGE));
        }
        self.interstitials.push(id.clone());
        Ok(id)
    }

    /// Returns whether anything changed.
    pub fn remove_interstitial(&mut self, id: &str) -> bool {
        let before = self.interstitials.len();
        self.interstitials.retain(|i| i != id);
        self.interstitials.len() != before
    }
}
