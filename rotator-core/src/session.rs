//! Session runtime driving the playback state machine.
//!
//! A single task owns all mutable state and processes commands one at a
//! time. Catalog fetches run in their own tasks and report back through the
//! same channel tagged with a request token; only the newest token is
//! applied. Presentation code talks to the session through a cloneable
//! [`SessionHandle`] and follows it through [`SessionEvent`]s.

use crate::catalog::{CatalogClient, RecentItems, ResolvedChannel};
use crate::clock::PlayerClock;
use crate::error::{CoreError, Result};
use crate::input::is_likely_video_input;
use crate::library::Library;
use crate::model::{Channel, ContentItem};
use crate::playback::{
    transition, Effect, PlaybackEvent, PlaybackInputs, PlaybackState, RebuildOrigin, Transition,
};
use crate::preferences::{Preferences, PreferencesRecord};
use crate::queue::{interleave, prepend_manual};
use crate::store::StateStore;
use crate::timer::BreakTimer;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "rotator::session";

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub const EMPTY_SOURCE_MESSAGE: &str = "Enter a channel or video link.";

/// Events emitted by the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Load and play a queue item from the start
    NowPlaying { index: usize, item: ContentItem },
    /// Load and play an interstitial
    InterstitialStarted { id: String },
    /// Jump the current item to a position
    Seek { item_id: String, position_secs: f64 },
    /// A break is running but there is nothing left to show
    NoInterstitialAvailable,
    /// The playback queue was rebuilt
    QueueUpdated { queue: Vec<ContentItem> },
    /// Nothing to play
    QueueIdle,
    /// A catalog fetch began
    RefreshStarted,
    /// Layout, ticker or interval settings changed
    PreferencesUpdated { preferences: Preferences },
    /// Informational message for the user
    Status { message: String },
    /// Error message for the user
    Error { message: String },
}

/// What an added source turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddedSource {
    Channel(Channel),
    ManualItem(ContentItem),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub playback: PlaybackState,
    pub queue: Vec<ContentItem>,
    pub current_item: Option<ContentItem>,
    pub position_secs: f64,
    pub channels: Vec<Channel>,
    pub manual_queue: Vec<ContentItem>,
    pub interstitials: Vec<String>,
    pub preferences: Preferences,
    pub refresh_in_flight: bool,
}

enum Command {
    AddChannel {
        resolved: ResolvedChannel,
        label: Option<String>,
        reply: oneshot::Sender<Result<Channel>>,
    },
    RemoveChannel {
        id: String,
    },
    AddManualItem {
        item: ContentItem,
        reply: oneshot::Sender<Result<ContentItem>>,
    },
    RemoveManualItem {
        id: String,
    },
    AddInterstitial {
        raw: String,
        reply: oneshot::Sender<Result<String>>,
    },
    RemoveInterstitial {
        id: String,
    },
    UpdatePreferences {
        record: PreferencesRecord,
        reply: oneshot::Sender<Preferences>,
    },
    Refresh,
    Playback(PlaybackEvent),
    ReportPosition {
        item_id: String,
        position_secs: f64,
        playing: bool,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    FetchCompleted {
        token: u64,
        channels: Vec<Channel>,
        result: Result<RecentItems>,
    },
    BreakDue {
        generation: u64,
    },
}

/// Entry point for starting a session
pub struct Session;

impl Session {
    /// Load persisted state and start the session task.
    ///
    /// The task runs until `cancel_token` is cancelled.
    #[must_use]
    pub fn spawn(
        catalog: Arc<dyn CatalogClient>,
        mut store: StateStore,
        cancel_token: CancellationToken,
    ) -> SessionHandle {
        let persisted = store.load();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let actor = SessionActor {
            catalog: Arc::clone(&catalog),
            store,
            library: Library::from_persisted(&persisted),
            preferences: persisted.preferences,
            channel_queue: Vec::new(),
            queue: Vec::new(),
            playback: PlaybackState::default(),
            timer: BreakTimer::new(cancel_token.child_token()),
            clock: PlayerClock::default(),
            refresh_token: 0,
            refresh_in_flight: false,
            commands: command_tx.clone(),
            events: event_tx.clone(),
            cancel_token,
        };
        tokio::spawn(actor.run(command_rx));

        SessionHandle {
            commands: command_tx,
            events: event_tx,
            catalog,
        }
    }
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<SessionEvent>,
    catalog: Arc<dyn CatalogClient>,
}

impl SessionHandle {
    /// Subscribe to session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Add whatever `raw` points at: a single video is pinned, anything else
    /// is resolved as a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, cannot be resolved or is a duplicate.
    pub async fn add_source(&self, raw: &str, label: Option<&str>) -> Result<AddedSource> {
        if raw.trim().is_empty() {
            return Err(CoreError::rejected(EMPTY_SOURCE_MESSAGE));
        }
        if is_likely_video_input(raw) {
            self.add_manual_video(raw).await.map(AddedSource::ManualItem)
        } else {
            self.add_channel(raw, label).await.map(AddedSource::Channel)
        }
    }

    /// Resolve and append a channel, then refresh the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails or the channel is already listed.
    pub async fn add_channel(&self, raw: &str, label: Option<&str>) -> Result<Channel> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::rejected(EMPTY_SOURCE_MESSAGE));
        }
        let resolved = self.report(self.catalog.resolve_channel(raw).await)?;
        let label = label.map(ToString::to_string);
        self.request(|reply| Command::AddChannel {
            resolved,
            label,
            reply,
        })
        .await?
    }

    /// Resolve a video and pin it at the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails or the video is already pinned.
    pub async fn add_manual_video(&self, raw: &str) -> Result<ContentItem> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::rejected(EMPTY_SOURCE_MESSAGE));
        }
        let item = self.report(self.catalog.resolve_video(raw).await)?;
        self.request(|reply| Command::AddManualItem { item, reply })
            .await?
    }

    /// Append an interstitial to the break rotation.
    ///
    /// # Errors
    ///
    /// Returns an error if no id can be extracted or it is already listed.
    pub async fn add_interstitial(&self, raw: &str) -> Result<String> {
        let raw = raw.to_string();
        self.request(|reply| Command::AddInterstitial { raw, reply })
            .await?
    }

    /// Remove a channel and rebuild the queue without its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn remove_channel(&self, id: &str) -> Result<()> {
        self.send(Command::RemoveChannel { id: id.to_string() })
    }

    /// Unpin a manually added video.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn remove_manual_video(&self, id: &str) -> Result<()> {
        self.send(Command::RemoveManualItem { id: id.to_string() })
    }

    /// Remove an interstitial and restart the rotation from the first one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn remove_interstitial(&self, id: &str) -> Result<()> {
        self.send(Command::RemoveInterstitial { id: id.to_string() })
    }

    /// Fetch fresh items for every channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh)
    }

    /// Move on to the next queue item.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn skip(&self) -> Result<()> {
        self.send(Command::Playback(PlaybackEvent::Skip))
    }

    /// The player reached the end of the current item.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn item_ended(&self) -> Result<()> {
        self.send(Command::Playback(PlaybackEvent::ItemEnded))
    }

    /// The player could not play the current item; it is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn item_failed(&self) -> Result<()> {
        self.send(Command::Playback(PlaybackEvent::ItemFailed))
    }

    /// The interstitial finished; playback resumes where it was interrupted.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn interstitial_ended(&self) -> Result<()> {
        self.send(Command::Playback(PlaybackEvent::InterstitialEnded))
    }

    /// The interstitial could not play; treated like its end.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn interstitial_failed(&self) -> Result<()> {
        self.send(Command::Playback(PlaybackEvent::InterstitialFailed))
    }

    /// Record the player's position in the current item.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub fn report_position(&self, item_id: &str, position_secs: f64, playing: bool) -> Result<()> {
        self.send(Command::ReportPosition {
            item_id: item_id.to_string(),
            position_secs,
            playing,
        })
    }

    /// Apply the fields present in `record` and return the effective preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub async fn update_preferences(&self, record: PreferencesRecord) -> Result<Preferences> {
        self.request(|reply| Command::UpdatePreferences { record, reply })
            .await
    }

    /// Current queue, playback state and library.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has shut down.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::SessionClosed)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply))?;
        response.await.map_err(|_| CoreError::SessionClosed)
    }

    /// Surface a resolution failure as an error event too.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(target: LOG_TARGET, "Could not resolve source: {}", e);
            let _ = self.events.send(SessionEvent::Error {
                message: e.to_string(),
            });
        }
        result
    }
}

struct SessionActor {
    catalog: Arc<dyn CatalogClient>,
    store: StateStore,
    library: Library,
    preferences: Preferences,
    /// Interleaved channel portion of the queue from the latest fetch
    channel_queue: Vec<ContentItem>,
    queue: Vec<ContentItem>,
    playback: PlaybackState,
    timer: BreakTimer,
    clock: PlayerClock,
    refresh_token: u64,
    refresh_in_flight: bool,
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<SessionEvent>,
    cancel_token: CancellationToken,
}

impl SessionActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(
            target: LOG_TARGET,
            "Starting session with {} catalog: {} channels, {} pinned items, {} interstitials",
            self.catalog.name(),
            self.library.channels.len(),
            self.library.manual_queue.len(),
            self.library.interstitials.len()
        );

        if !self.library.manual_queue.is_empty() {
            self.rebuild(RebuildOrigin::Library);
        }
        self.start_refresh();

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Session shutting down");
                    break;
                }
                command = commands.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => break,
                    }
                }
            }
        }

        self.timer.cancel();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::AddChannel {
                resolved,
                label,
                reply,
            } => {
                let result = self.add_channel(resolved, label.as_deref());
                let _ = reply.send(result);
            }
            Command::RemoveChannel { id } => self.remove_channel(&id),
            Command::AddManualItem { item, reply } => {
                let result = self.add_manual_item(item);
                let _ = reply.send(result);
            }
            Command::RemoveManualItem { id } => {
                if self.library.remove_manual_item(&id) {
                    self.persist(|store, library| store.save_manual_queue(&library.manual_queue));
                    self.rebuild(RebuildOrigin::Library);
                }
            }
            Command::AddInterstitial { raw, reply } => {
                let result = self.add_interstitial(&raw);
                let _ = reply.send(result);
            }
            Command::RemoveInterstitial { id } => {
                if self.library.remove_interstitial(&id) {
                    self.persist(|store, library| store.save_interstitials(&library.interstitials));
                    self.dispatch(PlaybackEvent::InterstitialRemoved);
                }
            }
            Command::UpdatePreferences { record, reply } => {
                let preferences = self.update_preferences(record);
                let _ = reply.send(preferences);
            }
            Command::Refresh => self.start_refresh(),
            Command::Playback(event) => {
                if event == PlaybackEvent::ItemFailed {
                    warn!(target: LOG_TARGET, "Player failed on {:?}, skipping", self.playback.now_playing);
                }
                self.dispatch(event);
            }
            Command::ReportPosition {
                item_id,
                position_secs,
                playing,
            } => self.report_position(&item_id, position_secs, playing),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::FetchCompleted {
                token,
                channels,
                result,
            } => self.fetch_completed(token, &channels, result),
            Command::BreakDue { generation } => self.break_due(generation),
        }
    }

    fn add_channel(&mut self, resolved: ResolvedChannel, label: Option<&str>) -> Result<Channel> {
        let channel = self
            .library
            .add_channel(resolved, label)
            .cloned()
            .inspect_err(|e| self.emit_error(e.to_string()))?;

        info!(target: LOG_TARGET, "Added channel {} ({})", channel.label, channel.id);
        self.persist(|store, library| store.save_channels(&library.channels));
        self.emit(SessionEvent::Status {
            message: "Channel added.".into(),
        });
        self.start_refresh();
        Ok(channel)
    }

    fn remove_channel(&mut self, id: &str) {
        if !self.library.remove_channel(id) {
            return;
        }
        info!(target: LOG_TARGET, "Removed channel {}", id);
        self.persist(|store, library| store.save_channels(&library.channels));

        if self.library.channels.is_empty() {
            // Any fetch still running is for a channel set that no longer exists
            self.refresh_token += 1;
            self.refresh_in_flight = false;
            self.channel_queue.clear();
            self.rebuild(RebuildOrigin::Library);
        } else {
            self.start_refresh();
        }
    }

    fn add_manual_item(&mut self, item: ContentItem) -> Result<ContentItem> {
        self.library
            .add_manual_item(item.clone())
            .inspect_err(|e| self.emit_error(e.to_string()))?;

        info!(target: LOG_TARGET, "Pinned {} ({})", item.title, item.id);
        self.persist(|store, library| store.save_manual_queue(&library.manual_queue));
        self.rebuild(RebuildOrigin::Library);
        self.emit(SessionEvent::Status {
            message: "Video added to the queue.".into(),
        });
        Ok(item)
    }

    fn add_interstitial(&mut self, raw: &str) -> Result<String> {
        let id = self
            .library
            .add_interstitial(raw)
            .inspect_err(|e| self.emit_error(e.to_string()))?;

        self.persist(|store, library| store.save_interstitials(&library.interstitials));
        self.dispatch(PlaybackEvent::InterstitialsChanged);
        Ok(id)
    }

    fn update_preferences(&mut self, record: PreferencesRecord) -> Preferences {
        let previous_interval = self.preferences.interstitial_interval();
        self.preferences.apply(record);

        if let Err(e) = self.store.save_preferences(&self.preferences) {
            warn!(target: LOG_TARGET, "Failed to save preferences: {}", e);
        }
        self.emit(SessionEvent::PreferencesUpdated {
            preferences: self.preferences.clone(),
        });
        if self.preferences.interstitial_interval() != previous_interval {
            self.dispatch(PlaybackEvent::IntervalChanged);
        }
        self.preferences.clone()
    }

    /// Only the item handed to the player last moves the clock.
    fn report_position(&mut self, item_id: &str, position_secs: f64, playing: bool) {
        let is_now_playing = self
            .playback
            .now_playing
            .as_deref()
            .is_some_and(|id| id.eq_ignore_ascii_case(item_id));
        if !is_now_playing {
            debug!(
                target: LOG_TARGET,
                "Ignoring position report for {} (clock follows {:?})",
                item_id,
                self.clock.item_id()
            );
            return;
        }
        self.clock.report(item_id, position_secs, playing);
    }

    fn start_refresh(&mut self) {
        if self.library.channels.is_empty() {
            debug!(target: LOG_TARGET, "No channels configured, nothing to refresh");
            return;
        }

        self.refresh_token += 1;
        self.refresh_in_flight = true;
        let token = self.refresh_token;
        let channels = self.library.channels.clone();
        let channel_ids = self.library.channel_ids();
        let catalog = Arc::clone(&self.catalog);
        let commands = self.commands.clone();
        let cancel_token = self.cancel_token.clone();

        debug!(target: LOG_TARGET, "Fetching recent items for {} channels (request {})", channels.len(), token);
        self.emit(SessionEvent::RefreshStarted);

        tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel_token.cancelled() => return,
                result = catalog.fetch_recent_items(&channel_ids) => result,
            };
            let _ = commands.send(Command::FetchCompleted {
                token,
                channels,
                result,
            });
        });
    }

    fn fetch_completed(&mut self, token: u64, channels: &[Channel], result: Result<RecentItems>) {
        if token != self.refresh_token {
            debug!(
                target: LOG_TARGET,
                "Discarding stale fetch response {} (latest is {})", token, self.refresh_token
            );
            return;
        }
        self.refresh_in_flight = false;

        match result {
            Ok(recent) => {
                self.channel_queue = interleave(channels, &recent.items_by_channel, &mut rand::rng());
                info!(
                    target: LOG_TARGET,
                    "Fetched {} items across {} channels",
                    self.channel_queue.len(),
                    channels.len()
                );
                self.rebuild(RebuildOrigin::Fetch);

                if let Some(summary) = recent.error_summary() {
                    warn!(target: LOG_TARGET, "Some channels failed: {}", summary);
                    self.emit_error(summary);
                }
                self.emit(SessionEvent::Status {
                    message: format!(
                        "Queue refreshed at {}",
                        chrono::Local::now().format("%H:%M:%S")
                    ),
                });
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Failed to fetch recent items: {}", e);
                self.emit_error(e.to_string());
            }
        }
    }

    fn break_due(&mut self, generation: u64) {
        if !self.timer.is_current(generation) {
            debug!(
                target: LOG_TARGET,
                "Ignoring superseded break timer {} (armed: {})",
                generation,
                self.timer.is_armed()
            );
            return;
        }
        self.timer.fired();

        let position_secs = self
            .playback
            .current_item(&self.queue)
            .map_or(0.0, |item| self.clock.position_for(&item.id));
        self.dispatch(PlaybackEvent::BreakDue { position_secs });
    }

    fn rebuild(&mut self, origin: RebuildOrigin) {
        self.queue = prepend_manual(&self.library.manual_queue, self.channel_queue.clone());
        self.emit(SessionEvent::QueueUpdated {
            queue: self.queue.clone(),
        });
        self.dispatch(PlaybackEvent::QueueRebuilt { origin });
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        let inputs = PlaybackInputs {
            queue: &self.queue,
            interstitials: &self.library.interstitials,
            interval: self.preferences.interstitial_interval(),
            refresh_in_flight: self.refresh_in_flight,
        };
        let Transition { state, effects } = transition(&self.playback, &inputs, event);
        self.playback = state;

        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::PlayItem { index, item } => {
                debug!(target: LOG_TARGET, "Playing #{} {} ({})", index, item.title, item.id);
                self.clock.start(&item.id);
                self.emit(SessionEvent::NowPlaying { index, item });
            }
            Effect::PlayInterstitial { id } => {
                info!(target: LOG_TARGET, "Starting interstitial {}", id);
                self.clock.pause();
                self.emit(SessionEvent::InterstitialStarted { id });
            }
            Effect::Seek {
                item_id,
                position_secs,
            } => {
                self.clock.report(&item_id, position_secs, true);
                self.emit(SessionEvent::Seek {
                    item_id,
                    position_secs,
                });
            }
            Effect::ArmBreakTimer { after } => {
                let commands = self.commands.clone();
                self.timer.arm(after, move |generation| {
                    let _ = commands.send(Command::BreakDue { generation });
                });
            }
            Effect::CancelBreakTimer => self.timer.cancel(),
            Effect::RequestRefresh => self.start_refresh(),
            Effect::NoInterstitialAvailable => {
                warn!(target: LOG_TARGET, "Interstitial list emptied during a break");
                self.emit(SessionEvent::NoInterstitialAvailable);
            }
            Effect::QueueIdle => self.emit(SessionEvent::QueueIdle),
        }
    }

    fn persist(&self, save: impl FnOnce(&StateStore, &Library) -> Result<()>) {
        if let Err(e) = save(&self.store, &self.library) {
            warn!(target: LOG_TARGET, "Failed to save state: {}", e);
            self.emit_error(e.to_string());
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let current_item = self.playback.current_item(&self.queue).cloned();
        let position_secs = current_item
            .as_ref()
            .map_or(0.0, |item| self.clock.position_for(&item.id));
        SessionSnapshot {
            playback: self.playback.clone(),
            queue: self.queue.clone(),
            current_item,
            position_secs,
            channels: self.library.channels.clone(),
            manual_queue: self.library.manual_queue.clone(),
            interstitials: self.library.interstitials.clone(),
            preferences: self.preferences.clone(),
            refresh_in_flight: self.refresh_in_flight,
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn emit_error(&self, message: String) {
        let _ = self.events.send(SessionEvent::Error { message });
    }
}
