//! Persisted player preferences: layout, ticker styling and break interval.
//!
//! The stored record is partial. Every field missing from it falls back to
//! its default on its own, so an old record never resets newer settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest break interval the player honours
pub const MIN_INTERSTITIAL_INTERVAL_MINUTES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Plain,
    /// Scrolling message bar over the player
    Ticker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TickerPosition {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStyle {
    pub text: String,
    pub font_size: u32,
    /// Seconds for one full scroll of the message
    pub loop_seconds: u32,
    pub background: String,
    pub color: String,
    pub position: TickerPosition,
}

fn default_ticker_text() -> String {
    "Sponsored: customise this message".to_string()
}

const fn default_font_size() -> u32 {
    16
}

const fn default_loop_seconds() -> u32 {
    18
}

fn default_background() -> String {
    "#0f172a".to_string()
}

fn default_color() -> String {
    "#a7f3d0".to_string()
}

impl Default for TickerStyle {
    fn default() -> Self {
        Self {
            text: default_ticker_text(),
            font_size: default_font_size(),
            loop_seconds: default_loop_seconds(),
            background: default_background(),
            color: default_color(),
            position: TickerPosition::default(),
        }
    }
}

impl TickerStyle {
    /// Font size for the current view. Outside fullscreen the bar shrinks to 60%,
    /// never below 10px.
    #[must_use]
    pub fn font_size_for_view(&self, fullscreen: bool) -> u32 {
        if fullscreen {
            self.font_size
        } else {
            (self.font_size.saturating_mul(3) / 5).max(10)
        }
    }
}

/// Effective preferences with every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub layout: LayoutMode,
    pub ticker: TickerStyle,
    pub interstitial_interval_minutes: u32,
}

const fn default_interval_minutes() -> u32 {
    5
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            layout: LayoutMode::default(),
            ticker: TickerStyle::default(),
            interstitial_interval_minutes: default_interval_minutes(),
        }
    }
}

impl Preferences {
    /// Interval between breaks, floored at one minute.
    #[must_use]
    pub fn interstitial_interval(&self) -> Duration {
        let minutes = self
            .interstitial_interval_minutes
            .max(MIN_INTERSTITIAL_INTERVAL_MINUTES);
        Duration::from_secs(u64::from(minutes) * 60)
    }

    /// Build from a stored record, field by field.
    #[must_use]
    pub fn from_record(record: PreferencesRecord) -> Self {
        let mut prefs = Self::default();
        prefs.apply(record);
        prefs
    }

    /// Override every field present in `record`.
    pub fn apply(&mut self, record: PreferencesRecord) {
        if let Some(layout) = record.layout_mode {
            self.layout = layout;
        }
        if let Some(text) = record.ticker_text.filter(|t| !t.is_empty()) {
            self.ticker.text = text;
        }
        if let Some(size) = record.ticker_font_size.filter(|s| *s > 0) {
            self.ticker.font_size = size;
        }
        if let Some(speed) = record.ticker_speed.filter(|s| *s > 0) {
            self.ticker.loop_seconds = speed;
        }
        if let Some(bg) = record.ticker_bg.filter(|c| !c.is_empty()) {
            self.ticker.background = bg;
        }
        if let Some(color) = record.ticker_color.filter(|c| !c.is_empty()) {
            self.ticker.color = color;
        }
        if let Some(position) = record.ticker_position {
            self.ticker.position = position;
        }
        if let Some(minutes) = record.interstitial_interval_minutes.filter(|m| *m > 0) {
            self.interstitial_interval_minutes = minutes;
        }
    }

    /// The full record written back to storage.
    #[must_use]
    pub fn to_record(&self) -> PreferencesRecord {
        PreferencesRecord {
            layout_mode: Some(self.layout),
            ticker_text: Some(self.ticker.text.clone()),
            ticker_font_size: Some(self.ticker.font_size),
            ticker_speed: Some(self.ticker.loop_seconds),
            ticker_bg: Some(self.ticker.background.clone()),
            ticker_color: Some(self.ticker.color.clone()),
            ticker_position: Some(self.ticker.position),
            interstitial_interval_minutes: Some(self.interstitial_interval_minutes),
        }
    }
}

/// Storage shape of [`Preferences`]; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_speed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_position: Option<TickerPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interstitial_interval_minutes: Option<u32>,
}
