//! Playback state machine.
//!
//! [`transition`] is a pure function from the current [`PlaybackState`], the
//! inputs it reads (queue, interstitial list, interval, refresh flag) and one
//! [`PlaybackEvent`] to the next state plus the [`Effect`]s the runtime must
//! carry out. Nothing here touches timers, players or the network.

use crate::model::ContentItem;
use serde::Serialize;
use std::time::Duration;

/// What the player is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Playing from the playback queue
    #[default]
    Normal,
    /// Playing an interstitial break
    Interstitial,
}

/// Where to pick normal playback back up after a break.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumePoint {
    /// Item that was current when the break began
    pub item_id: String,
    /// Playback offset captured at break time
    pub position_secs: f64,
}

/// Session-local playback state. Never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    pub current_index: usize,
    /// Set only while a break is running; consumed exactly once on return to normal
    pub resume: Option<ResumePoint>,
    pub interstitial_rotation_index: usize,
    /// Interstitial id being played, if any
    pub current_interstitial: Option<String>,
    /// Id of the queue item last handed to the player
    pub now_playing: Option<String>,
    /// Whether a break countdown is currently running
    pub break_timer_armed: bool,
}

impl PlaybackState {
    /// The queue item at `current_index`, if any.
    #[must_use]
    pub fn current_item<'a>(&self, queue: &'a [ContentItem]) -> Option<&'a ContentItem> {
        queue.get(self.current_index)
    }
}

/// Why the queue was rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOrigin {
    /// A catalog fetch delivered new items: playback restarts at the head
    Fetch,
    /// Pinned items or channels were edited locally: keep the current item when possible
    Library,
}

/// Discrete inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Current item played to the end
    ItemEnded,
    /// User asked for the next item
    Skip,
    /// Player reported an error for the current item
    ItemFailed,
    /// Break countdown elapsed; carries the player's position at that moment
    BreakDue { position_secs: f64 },
    InterstitialEnded,
    InterstitialFailed,
    QueueRebuilt { origin: RebuildOrigin },
    /// An interstitial was added
    InterstitialsChanged,
    /// An interstitial was removed; the rotation starts over
    InterstitialRemoved,
    IntervalChanged,
}

/// Side effects requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlayItem { index: usize, item: ContentItem },
    PlayInterstitial { id: String },
    Seek { item_id: String, position_secs: f64 },
    ArmBreakTimer { after: Duration },
    CancelBreakTimer,
    /// Ask the catalog for fresh items for the current channel set
    RequestRefresh,
    /// A break is running but every interstitial has been removed
    NoInterstitialAvailable,
    /// Nothing left to play
    QueueIdle,
}

/// Read-only view of everything a transition depends on besides the state.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackInputs<'a> {
    pub queue: &'a [ContentItem],
    pub interstitials: &'a [String],
    pub interval: Duration,
    pub refresh_in_flight: bool,
}

/// Result of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: PlaybackState,
    pub effects: Vec<Effect>,
}

/// Apply one event.
#[must_use]
pub fn transition(
    state: &PlaybackState,
    inputs: &PlaybackInputs<'_>,
    event: PlaybackEvent,
) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    let restart_timer = match event {
        PlaybackEvent::ItemEnded | PlaybackEvent::Skip | PlaybackEvent::ItemFailed => {
            advance(&mut next, inputs, &mut effects);
            false
        }
        PlaybackEvent::BreakDue { position_secs } => {
            start_break(&mut next, inputs, position_secs, &mut effects);
            false
        }
        PlaybackEvent::InterstitialEnded | PlaybackEvent::InterstitialFailed => {
            end_break(&mut next, inputs, &mut effects)
        }
        PlaybackEvent::QueueRebuilt { origin } => {
            queue_rebuilt(&mut next, inputs, origin, &mut effects);
            false
        }
        PlaybackEvent::InterstitialsChanged => {
            interstitials_changed(&mut next, inputs, &mut effects);
            true
        }
        PlaybackEvent::InterstitialRemoved => {
            next.interstitial_rotation_index = 0;
            interstitials_changed(&mut next, inputs, &mut effects);
            true
        }
        PlaybackEvent::IntervalChanged => true,
    };

    sync_break_timer(&mut next, inputs, restart_timer, &mut effects);

    Transition {
        state: next,
        effects,
    }
}

fn play(state: &mut PlaybackState, queue: &[ContentItem], effects: &mut Vec<Effect>) {
    if let Some(item) = queue.get(state.current_index) {
        state.now_playing = Some(item.id.clone());
        effects.push(Effect::PlayItem {
            index: state.current_index,
            item: item.clone(),
        });
    }
}

fn advance(state: &mut PlaybackState, inputs: &PlaybackInputs<'_>, effects: &mut Vec<Effect>) {
    if state.mode != PlaybackMode::Normal || inputs.queue.is_empty() {
        return;
    }

    let len = inputs.queue.len();
    let wrapped = state.current_index + 1 >= len;
    state.current_index = (state.current_index + 1) % len;
    play(state, inputs.queue, effects);

    if wrapped && !inputs.refresh_in_flight {
        effects.push(Effect::RequestRefresh);
    }
}

fn start_break(
    state: &mut PlaybackState,
    inputs: &PlaybackInputs<'_>,
    position_secs: f64,
    effects: &mut Vec<Effect>,
) {
    if state.mode != PlaybackMode::Normal || inputs.interstitials.is_empty() {
        return;
    }
    let Some(current) = state.current_item(inputs.queue) else {
        return;
    };

    state.resume = Some(ResumePoint {
        item_id: current.id.clone(),
        position_secs: position_secs.max(0.0),
    });

    let len = inputs.interstitials.len();
    let pick = state.interstitial_rotation_index % len;
    let id = inputs.interstitials[pick].clone();
    state.interstitial_rotation_index = (pick + 1) % len;
    state.current_interstitial = Some(id.clone());
    state.mode = PlaybackMode::Interstitial;

    effects.push(Effect::PlayInterstitial { id });
}

/// Returns whether the break countdown should restart.
fn end_break(
    state: &mut PlaybackState,
    inputs: &PlaybackInputs<'_>,
    effects: &mut Vec<Effect>,
) -> bool {
    if state.mode != PlaybackMode::Interstitial {
        return false;
    }

    state.mode = PlaybackMode::Normal;
    state.current_interstitial = None;
    let resume = state.resume.take();

    if inputs.queue.is_empty() {
        state.now_playing = None;
        effects.push(Effect::QueueIdle);
        return true;
    }

    let resume = resume.and_then(|point| {
        let index = locate(inputs.queue, state.current_index, &point.item_id)?;
        state.current_index = index;
        Some(point)
    });

    play(state, inputs.queue, effects);
    if let Some(point) = resume {
        effects.push(Effect::Seek {
            item_id: point.item_id,
            position_secs: point.position_secs,
        });
    }

    true
}

fn queue_rebuilt(
    state: &mut PlaybackState,
    inputs: &PlaybackInputs<'_>,
    origin: RebuildOrigin,
    effects: &mut Vec<Effect>,
) {
    let len = inputs.queue.len();
    let previous = state.now_playing.clone();

    state.current_index = match origin {
        RebuildOrigin::Fetch => 0,
        RebuildOrigin::Library => previous
            .as_deref()
            .and_then(|id| locate(inputs.queue, state.current_index, id))
            .unwrap_or_else(|| state.current_index.min(len.saturating_sub(1))),
    };

    if state.mode != PlaybackMode::Normal {
        return;
    }

    if len == 0 {
        if state.now_playing.take().is_some() || origin == RebuildOrigin::Fetch {
            effects.push(Effect::QueueIdle);
        }
        return;
    }

    let unchanged = state
        .current_item(inputs.queue)
        .zip(previous.as_deref())
        .is_some_and(|(item, id)| item.same_id(id));
    if !unchanged {
        play(state, inputs.queue, effects);
    }
}

fn interstitials_changed(
    state: &mut PlaybackState,
    inputs: &PlaybackInputs<'_>,
    effects: &mut Vec<Effect>,
) {
    if state.interstitial_rotation_index >= inputs.interstitials.len() {
        state.interstitial_rotation_index = 0;
    }

    if state.mode == PlaybackMode::Interstitial && inputs.interstitials.is_empty() {
        effects.push(Effect::NoInterstitialAvailable);
    }
}

/// Arm the countdown exactly when normal playback with breaks is possible.
fn sync_break_timer(
    state: &mut PlaybackState,
    inputs: &PlaybackInputs<'_>,
    restart: bool,
    effects: &mut Vec<Effect>,
) {
    let wanted = state.mode == PlaybackMode::Normal
        && !inputs.interstitials.is_empty()
        && state.current_item(inputs.queue).is_some();

    if wanted && (restart || !state.break_timer_armed) {
        state.break_timer_armed = true;
        effects.push(Effect::ArmBreakTimer {
            after: inputs.interval,
        });
    } else if !wanted && state.break_timer_armed {
        state.break_timer_armed = false;
        effects.push(Effect::CancelBreakTimer);
    }
}

/// Index of `id` in `queue`, preferring `hint` when it already holds that item.
fn locate(queue: &[ContentItem], hint: usize, id: &str) -> Option<usize> {
    if queue.get(hint).is_some_and(|item| item.same_id(id)) {
        return Some(hint);
    }
    queue.iter().position(|item| item.same_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn item(id: &str) -> ContentItem {
        ContentItem::new(id, id, "UC1", "Channel", "")
    }

    fn queue(ids: &[&str]) -> Vec<ContentItem> {
        ids.iter().map(|id| item(id)).collect()
    }

    fn ads(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn inputs<'a>(queue: &'a [ContentItem], interstitials: &'a [String]) -> PlaybackInputs<'a> {
        PlaybackInputs {
            queue,
            interstitials,
            interval: MINUTE,
            refresh_in_flight: false,
        }
    }

    /// Run a sequence of events, collecting every effect.
    fn run(
        mut state: PlaybackState,
        inputs: &PlaybackInputs<'_>,
        events: Vec<PlaybackEvent>,
    ) -> (PlaybackState, Vec<Effect>) {
        let mut all = Vec::new();
        for event in events {
            let t = transition(&state, inputs, event);
            state = t.state;
            all.extend(t.effects);
        }
        (state, all)
    }

    fn loaded(inputs: &PlaybackInputs<'_>) -> PlaybackState {
        transition(
            &PlaybackState::default(),
            inputs,
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Fetch,
            },
        )
        .state
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::default();
        assert_eq!(state.mode, PlaybackMode::Normal);
        assert_eq!(state.current_index, 0);
        assert!(state.resume.is_none());
    }

    #[test]
    fn test_first_fetch_plays_head_and_arms_timer() {
        let q = queue(&["a", "b"]);
        let a = ads(&["ad1"]);
        let t = transition(
            &PlaybackState::default(),
            &inputs(&q, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Fetch,
            },
        );
        assert_eq!(
            t.effects,
            vec![
                Effect::PlayItem {
                    index: 0,
                    item: item("a")
                },
                Effect::ArmBreakTimer { after: MINUTE },
            ]
        );
        assert!(t.state.break_timer_armed);
    }

    #[test]
    fn test_advance_on_empty_queue_is_noop() {
        let q = queue(&[]);
        let a = ads(&[]);
        let t = transition(&PlaybackState::default(), &inputs(&q, &a), PlaybackEvent::Skip);
        assert!(t.effects.is_empty());
        assert_eq!(t.state, PlaybackState::default());
    }

    #[test]
    fn test_advance_moves_forward_and_wraps() {
        let q = queue(&["a", "b", "c"]);
        let a = ads(&[]);
        let input = inputs(&q, &a);
        let state = loaded(&input);

        let t = transition(&state, &input, PlaybackEvent::ItemEnded);
        assert_eq!(t.state.current_index, 1);
        assert!(!t.effects.contains(&Effect::RequestRefresh));

        let (state, effects) = run(t.state, &input, vec![PlaybackEvent::Skip, PlaybackEvent::Skip]);
        assert_eq!(state.current_index, 0);
        assert_eq!(effects.last(), Some(&Effect::RequestRefresh));
    }

    #[test]
    fn test_wrap_refresh_fires_once_per_traversal() {
        let q = queue(&["a", "b", "c", "d"]);
        let a = ads(&[]);
        let input = inputs(&q, &a);
        let state = loaded(&input);

        let (_, effects) = run(state, &input, vec![PlaybackEvent::ItemEnded; 8]);
        let refreshes = effects
            .iter()
            .filter(|e| **e == Effect::RequestRefresh)
            .count();
        assert_eq!(refreshes, 2);
    }

    #[test]
    fn test_wrap_refresh_suppressed_while_in_flight() {
        let q = queue(&["a"]);
        let a = ads(&[]);
        let mut input = inputs(&q, &a);
        input.refresh_in_flight = true;
        let state = loaded(&input);

        let t = transition(&state, &input, PlaybackEvent::ItemEnded);
        assert!(!t.effects.contains(&Effect::RequestRefresh));
        assert_eq!(t.state.current_index, 0);
    }

    #[test]
    fn test_content_error_skips_like_advance() {
        let q = queue(&["a", "b"]);
        let a = ads(&[]);
        let input = inputs(&q, &a);
        let state = loaded(&input);

        let skipped = transition(&state, &input, PlaybackEvent::Skip);
        let failed = transition(&state, &input, PlaybackEvent::ItemFailed);
        assert_eq!(skipped, failed);
    }

    #[test]
    fn test_break_rotation_scenario() {
        let q = queue(&["a", "b"]);
        let a = ads(&["ad1", "ad2"]);
        let input = inputs(&q, &a);
        let state = loaded(&input);

        let t = transition(&state, &input, PlaybackEvent::BreakDue { position_secs: 42.5 });
        assert_eq!(t.state.mode, PlaybackMode::Interstitial);
        assert_eq!(t.state.current_interstitial.as_deref(), Some("ad1"));
        assert_eq!(
            t.effects,
            vec![
                Effect::PlayInterstitial { id: "ad1".into() },
                Effect::CancelBreakTimer,
            ]
        );

        let t = transition(&t.state, &input, PlaybackEvent::InterstitialEnded);
        assert_eq!(t.state.mode, PlaybackMode::Normal);
        assert!(t.state.resume.is_none());
        assert_eq!(
            t.effects,
            vec![
                Effect::PlayItem {
                    index: 0,
                    item: item("a")
                },
                Effect::Seek {
                    item_id: "a".into(),
                    position_secs: 42.5
                },
                Effect::ArmBreakTimer { after: MINUTE },
            ]
        );

        let t = transition(&t.state, &input, PlaybackEvent::BreakDue { position_secs: 1.0 });
        assert_eq!(t.state.current_interstitial.as_deref(), Some("ad2"));

        let t = transition(&t.state, &input, PlaybackEvent::InterstitialFailed);
        let t = transition(&t.state, &input, PlaybackEvent::BreakDue { position_secs: 1.0 });
        assert_eq!(t.state.current_interstitial.as_deref(), Some("ad1"));
    }

    #[test]
    fn test_break_ignored_without_interstitials_or_item() {
        let q = queue(&["a"]);
        let none = ads(&[]);
        let input = inputs(&q, &none);
        let state = loaded(&input);
        let t = transition(&state, &input, PlaybackEvent::BreakDue { position_secs: 3.0 });
        assert_eq!(t.state.mode, PlaybackMode::Normal);
        assert!(t.effects.is_empty());

        let empty = queue(&[]);
        let a = ads(&["ad1"]);
        let input = inputs(&empty, &a);
        let t = transition(
            &PlaybackState::default(),
            &input,
            PlaybackEvent::BreakDue { position_secs: 3.0 },
        );
        assert_eq!(t.state.mode, PlaybackMode::Normal);
    }

    #[test]
    fn test_resume_targets_interrupted_item_after_refresh() {
        let a = ads(&["ad1"]);
        let before = queue(&["x", "y", "z"]);
        let state = loaded(&inputs(&before, &a));
        let state = transition(&state, &inputs(&before, &a), PlaybackEvent::Skip).state;
        // "y" is current when the break starts
        let state = transition(
            &state,
            &inputs(&before, &a),
            PlaybackEvent::BreakDue { position_secs: 90.0 },
        )
        .state;

        // A refresh lands during the break and moves "y" elsewhere
        let after = queue(&["n1", "n2", "y"]);
        let state = transition(
            &state,
            &inputs(&after, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Fetch,
            },
        )
        .state;
        assert_eq!(state.current_index, 0);

        let t = transition(&state, &inputs(&after, &a), PlaybackEvent::InterstitialEnded);
        assert_eq!(t.state.current_index, 2);
        assert_eq!(
            t.effects[..2],
            [
                Effect::PlayItem {
                    index: 2,
                    item: item("y")
                },
                Effect::Seek {
                    item_id: "y".into(),
                    position_secs: 90.0
                },
            ]
        );
    }

    #[test]
    fn test_resume_discarded_when_item_left_queue() {
        let a = ads(&["ad1"]);
        let before = queue(&["x"]);
        let state = loaded(&inputs(&before, &a));
        let state = transition(
            &state,
            &inputs(&before, &a),
            PlaybackEvent::BreakDue { position_secs: 12.0 },
        )
        .state;

        let after = queue(&["n1", "n2"]);
        let t = transition(&state, &inputs(&after, &a), PlaybackEvent::InterstitialEnded);
        assert!(t.state.resume.is_none());
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::Seek { .. })));
        assert_eq!(
            t.effects[0],
            Effect::PlayItem {
                index: 0,
                item: item("n1")
            }
        );
    }

    #[test]
    fn test_advance_ignored_during_break() {
        let q = queue(&["a", "b"]);
        let a = ads(&["ad1"]);
        let input = inputs(&q, &a);
        let state = loaded(&input);
        let state = transition(&state, &input, PlaybackEvent::BreakDue { position_secs: 0.0 }).state;

        let t = transition(&state, &input, PlaybackEvent::ItemEnded);
        assert_eq!(t.state, state);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_removing_all_interstitials_during_break() {
        let q = queue(&["a"]);
        let a = ads(&["ad1"]);
        let state = loaded(&inputs(&q, &a));
        let state = transition(
            &state,
            &inputs(&q, &a),
            PlaybackEvent::BreakDue { position_secs: 5.0 },
        )
        .state;

        let none = ads(&[]);
        let t = transition(&state, &inputs(&q, &none), PlaybackEvent::InterstitialRemoved);
        assert_eq!(t.state.mode, PlaybackMode::Interstitial);
        assert_eq!(t.effects, vec![Effect::NoInterstitialAvailable]);

        // Still needs an end event to leave the break
        let t = transition(&t.state, &inputs(&q, &none), PlaybackEvent::InterstitialEnded);
        assert_eq!(t.state.mode, PlaybackMode::Normal);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::ArmBreakTimer { .. })));
    }

    #[test]
    fn test_timer_cancelled_when_interstitials_emptied() {
        let q = queue(&["a"]);
        let a = ads(&["ad1"]);
        let state = loaded(&inputs(&q, &a));
        assert!(state.break_timer_armed);

        let none = ads(&[]);
        let t = transition(&state, &inputs(&q, &none), PlaybackEvent::InterstitialRemoved);
        assert_eq!(t.effects, vec![Effect::CancelBreakTimer]);
        assert!(!t.state.break_timer_armed);
    }

    #[test]
    fn test_removal_restarts_rotation() {
        let q = queue(&["a"]);
        let a = ads(&["ad1", "ad2", "ad3"]);
        let input = inputs(&q, &a);
        let state = loaded(&input);
        let (state, _) = run(
            state,
            &input,
            vec![
                PlaybackEvent::BreakDue { position_secs: 0.0 },
                PlaybackEvent::InterstitialEnded,
            ],
        );
        assert_eq!(state.interstitial_rotation_index, 1);

        let fewer = ads(&["ad1", "ad3"]);
        let t = transition(&state, &inputs(&q, &fewer), PlaybackEvent::InterstitialRemoved);
        assert_eq!(t.state.interstitial_rotation_index, 0);

        let more = ads(&["ad1", "ad2", "ad3", "ad4"]);
        let t = transition(&state, &inputs(&q, &more), PlaybackEvent::InterstitialsChanged);
        assert_eq!(t.state.interstitial_rotation_index, 1);
    }

    #[test]
    fn test_interval_change_rearms_timer() {
        let q = queue(&["a"]);
        let a = ads(&["ad1"]);
        let state = loaded(&inputs(&q, &a));
        let mut input = inputs(&q, &a);
        input.interval = MINUTE * 3;

        let t = transition(&state, &input, PlaybackEvent::IntervalChanged);
        assert_eq!(
            t.effects,
            vec![Effect::ArmBreakTimer {
                after: MINUTE * 3
            }]
        );
    }

    #[test]
    fn test_advance_does_not_restart_running_timer() {
        let q = queue(&["a", "b"]);
        let a = ads(&["ad1"]);
        let input = inputs(&q, &a);
        let state = loaded(&input);

        let t = transition(&state, &input, PlaybackEvent::ItemEnded);
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ArmBreakTimer { .. })));
    }

    #[test]
    fn test_fetch_rebuild_restarts_at_head() {
        let a = ads(&[]);
        let before = queue(&["a", "b", "c"]);
        let state = loaded(&inputs(&before, &a));
        let state = transition(&state, &inputs(&before, &a), PlaybackEvent::Skip).state;

        let after = queue(&["n1", "b"]);
        let t = transition(
            &state,
            &inputs(&after, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Fetch,
            },
        );
        assert_eq!(t.state.current_index, 0);
        assert_eq!(
            t.effects,
            vec![Effect::PlayItem {
                index: 0,
                item: item("n1")
            }]
        );

        // A head that is already playing is not restarted
        let again = transition(
            &t.state,
            &inputs(&after, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Fetch,
            },
        );
        assert!(again.effects.is_empty());
    }

    #[test]
    fn test_library_rebuild_keeps_current_item() {
        let a = ads(&[]);
        let before = queue(&["c1", "c2", "c3"]);
        let state = loaded(&inputs(&before, &a));
        let state = transition(&state, &inputs(&before, &a), PlaybackEvent::Skip).state;
        assert_eq!(state.now_playing.as_deref(), Some("c2"));

        // A pinned item is prepended
        let after = queue(&["m1", "c1", "c2", "c3"]);
        let t = transition(
            &state,
            &inputs(&after, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Library,
            },
        );
        assert_eq!(t.state.current_index, 2);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_library_rebuild_clamps_when_current_removed() {
        let a = ads(&[]);
        let before = queue(&["m1", "c1"]);
        let state = loaded(&inputs(&before, &a));
        let state = transition(&state, &inputs(&before, &a), PlaybackEvent::Skip).state;

        let after = queue(&["m1"]);
        let t = transition(
            &state,
            &inputs(&after, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Library,
            },
        );
        assert_eq!(t.state.current_index, 0);
        assert_eq!(
            t.effects,
            vec![Effect::PlayItem {
                index: 0,
                item: item("m1")
            }]
        );
    }

    #[test]
    fn test_emptied_queue_goes_idle_and_cancels_timer() {
        let a = ads(&["ad1"]);
        let before = queue(&["a"]);
        let state = loaded(&inputs(&before, &a));

        let empty = queue(&[]);
        let t = transition(
            &state,
            &inputs(&empty, &a),
            PlaybackEvent::QueueRebuilt {
                origin: RebuildOrigin::Library,
            },
        );
        assert_eq!(t.effects, vec![Effect::QueueIdle, Effect::CancelBreakTimer]);
        assert!(t.state.now_playing.is_none());
    }
}
