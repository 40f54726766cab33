//! Cancellable break countdown.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const LOG_TARGET: &str = "rotator::timer";

/// One-shot countdown that can be re-armed or cancelled at any time.
///
/// Every arm bumps a generation number which is passed to the fire callback.
/// A fire whose generation no longer matches [`BreakTimer::is_current`] came
/// from a countdown that was superseded after it had already elapsed and must
/// be ignored.
pub struct BreakTimer {
    parent: CancellationToken,
    current: Option<CancellationToken>,
    generation: u64,
}

impl BreakTimer {
    /// Create an idle timer. Cancelling `parent` cancels any running countdown.
    #[must_use]
    pub const fn new(parent: CancellationToken) -> Self {
        Self {
            parent,
            current: None,
            generation: 0,
        }
    }

    /// Start a fresh countdown, cancelling the previous one. Returns its generation.
    pub fn arm<F>(&mut self, after: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let token = self.parent.child_token();
        self.current = Some(token.clone());

        debug!(target: LOG_TARGET, "Break timer armed for {:?} (generation {})", after, generation);

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(after) => on_fire(generation),
            }
        });

        generation
    }

    /// Stop the running countdown, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
            debug!(target: LOG_TARGET, "Break timer cancelled (generation {})", self.generation);
        }
    }

    /// Whether a fire with `generation` belongs to the running countdown.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.is_some() && self.generation == generation
    }

    /// Mark the running countdown as consumed after its fire was handled.
    pub fn fired(&mut self) {
        self.current = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.current.is_some()
    }
}

impl Drop for BreakTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
