//! Last known player position, interpolated between reports.

use tokio::time::Instant;

/// Tracks where the external player is in the current item.
///
/// The player reports its position now and then; in between, a playing
/// clock advances with wall time so a break can capture an accurate offset.
#[derive(Debug, Clone)]
pub struct PlayerClock {
    item_id: Option<String>,
    position_secs: f64,
    playing: bool,
    updated_at: Instant,
}

impl Default for PlayerClock {
    fn default() -> Self {
        Self {
            item_id: None,
            position_secs: 0.0,
            playing: false,
            updated_at: Instant::now(),
        }
    }
}

impl PlayerClock {
    /// Reset for a newly started item.
    pub fn start(&mut self, item_id: &str) {
        self.set(item_id, 0.0, true);
    }

    /// Record a position reported by the player.
    pub fn report(&mut self, item_id: &str, position_secs: f64, playing: bool) {
        self.set(item_id, position_secs, playing);
    }

    /// Stop interpolating, e.g. while an interstitial plays.
    pub fn pause(&mut self) {
        self.position_secs = self.interpolated_secs();
        self.playing = false;
        self.updated_at = Instant::now();
    }

    fn set(&mut self, item_id: &str, position_secs: f64, playing: bool) {
        self.item_id = Some(item_id.to_string());
        self.position_secs = position_secs.max(0.0);
        self.playing = playing;
        self.updated_at = Instant::now();
    }

    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    /// Current position, advanced by elapsed time while playing.
    #[must_use]
    pub fn interpolated_secs(&self) -> f64 {
        if !self.playing {
            return self.position_secs;
        }
        self.position_secs + self.updated_at.elapsed().as_secs_f64()
    }

    /// Position for `item_id`, or zero when the clock tracks another item.
    #[must_use]
    pub fn position_for(&self, item_id: &str) -> f64 {
        match self.item_id.as_deref() {
            Some(id) if id.eq_ignore_ascii_case(item_id) => self.interpolated_secs(),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_interpolates_while_playing() {
        let mut clock = PlayerClock::default();
        clock.report("a", 10.0, true);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!((clock.position_for("a") - 15.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_clock_holds_position() {
        let mut clock = PlayerClock::default();
        clock.report("a", 10.0, false);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!((clock.interpolated_secs() - 10.0).abs() < 1e-6);

        clock.report("a", 10.0, true);
        tokio::time::advance(Duration::from_secs(2)).await;
        clock.pause();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!((clock.interpolated_secs() - 12.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_item_reads_zero() {
        let mut clock = PlayerClock::default();
        clock.start("a");
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(clock.position_for("b").abs() < f64::EPSILON);
        assert_eq!(clock.item_id(), Some("a"));
    }
}
