//! Playback coordinator
//!
//! One [`Player`] per output serializes playback commands against the shared
//! engine and maintains the published [`StatusSnapshot`] for that output.
//!
//! The state machine has five states (stopped, transitioning, buffering,
//! playing, paused). Every transition command first claims the
//! `Transitioning` state; a command arriving while a transition is in flight
//! is rejected with BUSY and the rejection is also published to observers.
//! The claim and the check happen under one lock acquisition, so two racing
//! commands can never both pass the guard.
//!
//! Command failures split two ways:
//! - caller misuse (bad argument, unknown track, command while busy) returns
//!   `Err` synchronously and changes nothing,
//! - engine failures return `Ok(())` and surface as a published error. After
//!   a failed `play`, `stop` or trick-play command the player stays in
//!   `Transitioning` until the engine reports a state; the buffering
//!   commands force their target state even on failure. A successful `play`
//!   also stays in `Transitioning`: only the engine's own state report ends
//!   a start.

use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, trace, warn};
use tvlink_common::events::{
    ConnectionChange, DataKind, EngineEvent, PlayInfo, PlaybackStatus, PlayerState,
};
use tvlink_common::media::MediaDescription;
use tvlink_common::{Error, ErrorCode, Result};

use crate::datafeed::{DataConsumer, DataFeed};
use crate::engine::{EngineResult, VolumeLevel};
use crate::feeds::{DsmccFeed, HbbTvFeed, SubtitlesFeed, TeletextFeed};
use crate::gateway::{EngineGateway, EngineObserver};
use crate::output::OutputId;
use crate::status::StatusSnapshot;

/// Position argument meaning "wherever playback currently is".
pub const CURRENT_POSITION: i64 = -1;

/// Speed argument that pauses playback.
pub const PAUSE_SPEED: i16 = 0;

/// Normal forward playback speed.
pub const NORMAL_SPEED: i16 = 1;

/// Receiver of playback status changes of one [`Player`].
///
/// All methods default to no-ops so an observer only implements what it
/// cares about. Callbacks arrive on the engine thread or on the thread of
/// the command that caused them; implementations must not block and must
/// not synchronously call back into the same player.
pub trait PlayerObserver: Send + Sync {
    fn on_state_changed(&self, _state: PlayerState) {}
    fn on_play_info(&self, _info: &PlayInfo) {}
    fn on_playback_status(&self, _status: PlaybackStatus) {}
    fn on_error(&self, _code: ErrorCode) {}
    fn on_connection_changed(&self, _change: &ConnectionChange) {}
}

/// Playback coordinator for one output.
pub struct Player {
    // Handle to our own allocation, needed to unregister from the gateway.
    self_ref: Weak<Player>,
    gateway: Arc<EngineGateway>,
    out: OutputId,
    status: Mutex<StatusSnapshot>,
    observers: RwLock<Vec<Arc<dyn PlayerObserver>>>,
    media: Mutex<Option<MediaDescription>>,
    feed: Arc<DataFeed>,
    teletext: Arc<TeletextFeed>,
    subtitles: Arc<SubtitlesFeed>,
    hbbtv: Arc<HbbTvFeed>,
    dsmcc: Arc<DsmccFeed>,
}

impl Player {
    /// Create the coordinator for `out`, hook it up to engine events, and
    /// bind one typed feed per side-channel kind.
    pub fn new(gateway: Arc<EngineGateway>, out: OutputId) -> Arc<Self> {
        let feed = DataFeed::new(Arc::clone(&gateway), out);
        let teletext = TeletextFeed::new(&feed);
        let subtitles = SubtitlesFeed::new(&feed);
        let hbbtv = HbbTvFeed::new();
        let dsmcc = DsmccFeed::new();
        let consumers: [(DataKind, Arc<dyn DataConsumer>); 4] = [
            (DataKind::Teletext, Arc::clone(&teletext) as _),
            (DataKind::Subtitles, Arc::clone(&subtitles) as _),
            (DataKind::HbbTv, Arc::clone(&hbbtv) as _),
            (DataKind::Dsmcc, Arc::clone(&dsmcc) as _),
        ];
        for (kind, consumer) in consumers {
            // The feed is freshly constructed, all four slots are empty.
            let bound = feed.bind(kind, consumer);
            debug_assert!(bound.is_ok(), "slot for {kind} already taken");
        }
        let player = Arc::new_cyclic(|me| Player {
            self_ref: me.clone(),
            gateway: Arc::clone(&gateway),
            out,
            status: Mutex::new(StatusSnapshot::default()),
            observers: RwLock::new(Vec::new()),
            media: Mutex::new(None),
            feed,
            teletext,
            subtitles,
            hbbtv,
            dsmcc,
        });
        gateway.register_observer(out, Arc::clone(&player) as Arc<dyn EngineObserver>);
        player
    }

    pub fn output(&self) -> OutputId {
        self.out
    }

    /// The side-channel demultiplexer of this output.
    pub fn data_feed(&self) -> &Arc<DataFeed> {
        &self.feed
    }

    pub fn teletext(&self) -> &Arc<TeletextFeed> {
        &self.teletext
    }

    pub fn subtitles(&self) -> &Arc<SubtitlesFeed> {
        &self.subtitles
    }

    pub fn hbbtv(&self) -> &Arc<HbbTvFeed> {
        &self.hbbtv
    }

    pub fn dsmcc(&self) -> &Arc<DsmccFeed> {
        &self.dsmcc
    }

    /// Unhook the player and its data feed from engine callbacks and drop
    /// all observers. Must be called before the handle is discarded;
    /// commands still work afterwards.
    pub fn detach(&self) {
        if let Some(me) = self.self_ref.upgrade() {
            self.gateway
                .unregister_observer(self.out, &(me as Arc<dyn EngineObserver>));
        }
        self.feed.detach();
        self.observers.write().unwrap().clear();
    }

    // --- Observers ---

    /// Register `observer`. Each Arc may be registered once per player.
    pub fn add_observer(&self, observer: Arc<dyn PlayerObserver>) -> Result<()> {
        let target = Arc::as_ptr(&observer) as *const ();
        let mut observers = self.observers.write().unwrap();
        if observers
            .iter()
            .any(|obs| Arc::as_ptr(obs) as *const () == target)
        {
            return Err(Error::InvalidArgument(
                "observer already registered".to_string(),
            ));
        }
        observers.push(observer);
        Ok(())
    }

    pub fn remove_observer(&self, observer: &Arc<dyn PlayerObserver>) {
        let target = Arc::as_ptr(observer) as *const ();
        self.observers
            .write()
            .unwrap()
            .retain(|obs| Arc::as_ptr(obs) as *const () != target);
    }

    // --- Status ---

    /// Current status. Transient fields are only populated between being
    /// set and being delivered; a snapshot taken at rest shows them empty.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.status.lock().unwrap().clone()
    }

    pub fn state(&self) -> PlayerState {
        self.status.lock().unwrap().state
    }

    // --- Playback commands ---

    /// Start playback of `uri` from the stream's natural start position.
    /// The state stays `Transitioning` until the engine reports one.
    pub fn play(&self, uri: &str) -> Result<()> {
        self.start_playback(uri, None)
    }

    /// Start playback of `uri` at `offset_secs` ([`CURRENT_POSITION`] for
    /// the stream's current position) with the given speed.
    pub fn play_from(&self, uri: &str, offset_secs: i64, speed: i16) -> Result<()> {
        let extras = format!("pos={offset_secs}&speed={speed}");
        self.start_playback(uri, Some(&extras))
    }

    fn start_playback(&self, uri: &str, extras: Option<&str>) -> Result<()> {
        if uri.is_empty() {
            return Err(Error::InvalidArgument("empty playback URI".to_string()));
        }
        self.begin_transition()?;
        self.status.lock().unwrap().play_info.take();
        self.media.lock().unwrap().take();
        let engine_uri = normalize_uri(uri);
        match self.gateway.start(self.out, &engine_uri, extras) {
            Ok(()) => {
                self.status.lock().unwrap().uri = Some(uri.to_string());
            }
            Err(code) => {
                warn!("Output {}: start of {uri} failed: {code}", self.out);
                self.fire_error(code);
            }
        }
        Ok(())
    }

    /// Stop playback. The URI and media description are cleared on success;
    /// on failure the state stays `Transitioning`.
    pub fn stop(&self) -> Result<()> {
        self.begin_transition()?;
        match self.gateway.stop(self.out) {
            Ok(()) => {
                self.status.lock().unwrap().uri = None;
                self.media.lock().unwrap().take();
                self.set_state(PlayerState::Stopped);
            }
            Err(code) => {
                warn!("Output {}: stop failed: {code}", self.out);
                self.fire_error(code);
            }
        }
        Ok(())
    }

    /// Pause (`enable = true`) or resume at the current position.
    pub fn pause(&self, enable: bool) -> Result<()> {
        let speed = if enable { PAUSE_SPEED } else { NORMAL_SPEED };
        self.set_speed(speed)
    }

    /// Change playback speed without moving (0 pauses, negative rewinds).
    pub fn set_speed(&self, speed: i16) -> Result<()> {
        let target = if speed == PAUSE_SPEED {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        };
        self.trick(CURRENT_POSITION, speed, target)
    }

    /// Jump to `offset_secs` and play at normal speed.
    pub fn jump(&self, offset_secs: i64) -> Result<()> {
        if offset_secs < 0 {
            return Err(Error::InvalidArgument(format!(
                "jump position must be non-negative, got {offset_secs}"
            )));
        }
        self.trick(offset_secs, NORMAL_SPEED, PlayerState::Playing)
    }

    fn trick(&self, offset_secs: i64, speed: i16, target: PlayerState) -> Result<()> {
        self.begin_transition()?;
        match self.gateway.trick_play(self.out, offset_secs, speed) {
            Ok(()) => self.set_state(target),
            Err(code) => {
                warn!(
                    "Output {}: trick play (offset {offset_secs}, speed {speed}) failed: {code}",
                    self.out
                );
                self.fire_error(code);
            }
        }
        Ok(())
    }

    /// Enter timeshift buffering. The state becomes `Buffering` even when
    /// the engine rejects the command; the engine's own state reports settle
    /// any disagreement.
    pub fn start_buffering(&self) -> Result<()> {
        self.begin_transition()?;
        if let Err(code) = self.gateway.buffer(self.out, true) {
            warn!("Output {}: start buffering failed: {code}", self.out);
            self.fire_error(code);
        }
        self.set_state(PlayerState::Buffering);
        Ok(())
    }

    /// Leave timeshift buffering and return to live playback. The state
    /// becomes `Playing` even when the engine rejects the command.
    pub fn stop_buffering(&self) -> Result<()> {
        self.begin_transition()?;
        if let Err(code) = self.gateway.buffer(self.out, false) {
            warn!("Output {}: stop buffering failed: {code}", self.out);
            self.fire_error(code);
        }
        self.set_state(PlayerState::Playing);
        Ok(())
    }

    // --- Media ---

    /// Describe the media currently playing. The description is fetched
    /// from the engine once and cached until the next `play` or track
    /// selection change. A failed fetch is published like any other engine
    /// failure; the `Err` return tells the caller there is nothing to show.
    pub fn media_description(&self) -> Result<MediaDescription> {
        let mut cache = self.media.lock().unwrap();
        if let Some(desc) = cache.as_ref() {
            return Ok(desc.clone());
        }
        let desc = match self.gateway.media_description(self.out) {
            Ok(desc) => desc,
            Err(code) => {
                warn!("Output {}: media description fetch failed: {code}", self.out);
                self.fire_error(code);
                return Err(Error::Engine(code));
            }
        };
        *cache = Some(desc.clone());
        Ok(desc)
    }

    /// Select elementary stream `id` for presentation.
    pub fn select_track(&self, id: u32) -> Result<()> {
        self.set_track(id, true)
    }

    /// Deselect elementary stream `id`.
    pub fn deselect_track(&self, id: u32) -> Result<()> {
        self.set_track(id, false)
    }

    fn set_track(&self, id: u32, on: bool) -> Result<()> {
        let desc = self.media_description()?;
        if !desc.tracks.iter().any(|t| t.id == id) {
            return Err(Error::NotFound(format!("no track {id} in current media")));
        }
        match self.gateway.select_track(self.out, id, on) {
            Ok(()) => {
                // Selection changed, the cached description is stale.
                self.media.lock().unwrap().take();
                self.status.lock().unwrap().error.take();
            }
            Err(code) => {
                warn!("Output {}: track {id} selection failed: {code}", self.out);
                self.fire_error(code);
            }
        }
        Ok(())
    }

    // --- Output settings ---

    /// Position and size the video window of this output.
    pub fn set_video_window(&self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        self.forward(self.gateway.setup_video(self.out, x, y, width, height))
    }

    /// Pass compressed audio through to the sink instead of decoding.
    pub fn set_audio_passthrough(&self, enable: bool) -> Result<()> {
        self.forward(self.gateway.set_audio_passthrough(self.out, enable))
    }

    pub fn set_volume_leveling(&self, enable: bool, level: VolumeLevel) -> Result<()> {
        self.forward(self.gateway.set_volume_leveling(self.out, enable, level))
    }

    // --- Internals ---

    /// Surface an engine failure as published status instead of an `Err`.
    fn forward(&self, result: EngineResult<()>) -> Result<()> {
        if let Err(code) = result {
            self.fire_error(code);
        }
        Ok(())
    }

    /// Claim the transitioning state. Check and claim happen under one lock
    /// acquisition; a concurrent command sees `Transitioning` and is
    /// rejected with BUSY, which is also published to observers.
    fn begin_transition(&self) -> Result<()> {
        let busy = {
            let mut status = self.status.lock().unwrap();
            if status.state == PlayerState::Transitioning {
                true
            } else {
                status.state = PlayerState::Transitioning;
                status.error.take();
                false
            }
        };
        if busy {
            self.fire_error(ErrorCode::Busy);
            return Err(Error::Busy(
                "playback transition already in progress".to_string(),
            ));
        }
        debug!("Output {}: state -> transitioning", self.out);
        for observer in self.observer_snapshot() {
            observer.on_state_changed(PlayerState::Transitioning);
        }
        Ok(())
    }

    fn observer_snapshot(&self) -> Vec<Arc<dyn PlayerObserver>> {
        self.observers.read().unwrap().clone()
    }

    // Always notifies, even when the reported state equals the current one;
    // observers may key off the report itself, not just the value.
    fn set_state(&self, state: PlayerState) {
        self.status.lock().unwrap().state = state;
        debug!("Output {}: state -> {state}", self.out);
        for observer in self.observer_snapshot() {
            observer.on_state_changed(state);
        }
    }

    fn fire_error(&self, code: ErrorCode) {
        warn!("Output {}: error {code}", self.out);
        self.status.lock().unwrap().error.set(code);
        for observer in self.observer_snapshot() {
            observer.on_error(code);
        }
        self.status.lock().unwrap().error.take();
    }

    fn fire_play_info(&self, info: PlayInfo) {
        self.status.lock().unwrap().play_info.set(info);
        for observer in self.observer_snapshot() {
            observer.on_play_info(&info);
        }
        self.status.lock().unwrap().play_info.take();
    }

    fn fire_playback_status(&self, playback: PlaybackStatus) {
        self.status.lock().unwrap().playback_status.set(playback);
        for observer in self.observer_snapshot() {
            observer.on_playback_status(playback);
        }
        self.status.lock().unwrap().playback_status.take();
    }

    fn fire_connection(&self, change: ConnectionChange) {
        self.status.lock().unwrap().connection.set(change);
        for observer in self.observer_snapshot() {
            observer.on_connection_changed(&change);
        }
        self.status.lock().unwrap().connection.take();
    }
}

impl EngineObserver for Player {
    fn on_event(&self, out: OutputId, event: &EngineEvent) {
        if out != self.out {
            return;
        }
        match event {
            EngineEvent::StateChange { state } => self.set_state(*state),
            EngineEvent::Error { code } => self.fire_error(*code),
            EngineEvent::ConnectionChange { change } => self.fire_connection(*change),
            EngineEvent::PlayInfo { info } => {
                if self.state() == PlayerState::Transitioning {
                    trace!("Output {}: play info dropped during transition", self.out);
                    return;
                }
                self.fire_play_info(*info);
            }
            EngineEvent::PlaybackStatus { status } => {
                if self.state() == PlayerState::Transitioning {
                    trace!(
                        "Output {}: playback status dropped during transition",
                        self.out
                    );
                    return;
                }
                self.fire_playback_status(*status);
            }
        }
    }
}

/// Local `file:/` URIs reach the engine in `file:///` form; every other
/// scheme passes through untouched. The published status keeps the URI as
/// the caller gave it.
fn normalize_uri(uri: &str) -> String {
    if uri.starts_with("file:/") && !uri.starts_with("file:///") {
        uri.replacen("file:/", "file:///", 1)
    } else {
        uri.to_string()
    }
}
