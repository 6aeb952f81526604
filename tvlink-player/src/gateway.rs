//! Engine gateway
//!
//! [`EngineGateway`] is the single front door to the native engine: it owns
//! the [`EngineBackend`], forwards commands to it, and routes engine
//! callbacks to the observers registered for the matching [`OutputId`].
//!
//! The gateway never interprets events. It snapshots the observer list,
//! releases the registry lock, then notifies, so observer code can call back
//! into the gateway (including unregistering itself) without deadlocking.

use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use tracing::{debug, info, trace};
use tvlink_common::events::{DataFormat, DataKind, EngineEvent};
use tvlink_common::media::MediaDescription;
use tvlink_common::{Error, Result};

use crate::engine::{EngineBackend, EngineResult, TeletextLink, VolumeLevel};
use crate::output::OutputId;

/// Receiver of engine playback events for one output.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, out: OutputId, event: &EngineEvent);
}

/// Receiver of engine side-channel data for one output. The return code
/// travels back to the native boundary.
pub trait EngineDataObserver: Send + Sync {
    fn on_data(
        &self,
        out: OutputId,
        kind: DataKind,
        format: DataFormat,
        payload: &[u8],
    ) -> EngineResult<()>;
}

static GATEWAY: OnceCell<Arc<EngineGateway>> = OnceCell::new();

/// Front door to the native engine.
///
/// Command methods forward to the backend unchanged and hand its error code
/// back to the caller; the playback coordinator decides which failures reach
/// the application as errors and which become published status.
pub struct EngineGateway {
    backend: Arc<dyn EngineBackend>,
    observers: RwLock<Vec<(OutputId, Arc<dyn EngineObserver>)>>,
    data_observers: RwLock<Vec<(OutputId, Arc<dyn EngineDataObserver>)>>,
}

impl EngineGateway {
    /// Create a gateway over `backend` and bring the engine up.
    pub fn new(backend: Arc<dyn EngineBackend>) -> Result<Arc<Self>> {
        backend.init().map_err(Error::Engine)?;
        info!("Engine initialized: {}", backend.version());
        Ok(Arc::new(EngineGateway {
            backend,
            observers: RwLock::new(Vec::new()),
            data_observers: RwLock::new(Vec::new()),
        }))
    }

    /// Initialize the process-wide gateway, or return the existing one.
    ///
    /// The first call wins; later calls get the same instance and their
    /// `backend` is dropped unused.
    pub fn global_with(backend: Arc<dyn EngineBackend>) -> Result<Arc<Self>> {
        GATEWAY
            .get_or_try_init(|| EngineGateway::new(backend))
            .cloned()
    }

    /// The process-wide gateway, if [`global_with`](Self::global_with) ran.
    pub fn global() -> Option<Arc<Self>> {
        GATEWAY.get().cloned()
    }

    /// Engine version string, for diagnostics.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Tear the engine down and drop all registrations.
    pub fn shutdown(&self) -> Result<()> {
        self.observers.write().unwrap().clear();
        self.data_observers.write().unwrap().clear();
        self.backend.deinit().map_err(Error::Engine)?;
        info!("Engine shut down");
        Ok(())
    }

    // --- Observer registry ---

    /// Register `observer` for events of `out`. One observer may be
    /// registered for several outputs; each registration is independent.
    pub fn register_observer(&self, out: OutputId, observer: Arc<dyn EngineObserver>) {
        let mut observers = self.observers.write().unwrap();
        observers.push((out, observer));
        debug!("Observer registered for output {out} ({} total)", observers.len());
    }

    /// Remove every registration of `observer` for `out`. Unknown
    /// registrations are ignored.
    pub fn unregister_observer(&self, out: OutputId, observer: &Arc<dyn EngineObserver>) {
        let target = Arc::as_ptr(observer) as *const ();
        let mut observers = self.observers.write().unwrap();
        observers.retain(|(o, obs)| *o != out || Arc::as_ptr(obs) as *const () != target);
    }

    /// Register `observer` for side-channel data of `out`.
    pub fn register_data_observer(&self, out: OutputId, observer: Arc<dyn EngineDataObserver>) {
        let mut observers = self.data_observers.write().unwrap();
        observers.push((out, observer));
        debug!(
            "Data observer registered for output {out} ({} total)",
            observers.len()
        );
    }

    /// Remove every registration of `observer` for `out`.
    pub fn unregister_data_observer(&self, out: OutputId, observer: &Arc<dyn EngineDataObserver>) {
        let target = Arc::as_ptr(observer) as *const ();
        let mut observers = self.data_observers.write().unwrap();
        observers.retain(|(o, obs)| *o != out || Arc::as_ptr(obs) as *const () != target);
    }

    // --- Callback dispatch (engine thread) ---

    /// Route one engine event to the observers of `out`, in registration
    /// order. Events for an output with no observers are dropped.
    pub fn dispatch_event(&self, out: OutputId, event: &EngineEvent) {
        trace!("Engine event on output {out}: {}", event.event_type());
        let targets: Vec<Arc<dyn EngineObserver>> = {
            let observers = self.observers.read().unwrap();
            observers
                .iter()
                .filter(|(o, _)| *o == out)
                .map(|(_, obs)| Arc::clone(obs))
                .collect()
        };
        if targets.is_empty() {
            trace!("No observer for output {out}, event dropped");
            return;
        }
        for observer in targets {
            observer.on_event(out, event);
        }
    }

    /// Route one side-channel payload to the data observers of `out`.
    /// Every observer is invoked; the first failure code is handed back to
    /// the native boundary. An output with no observers drops the payload.
    pub fn dispatch_data(
        &self,
        out: OutputId,
        kind: DataKind,
        format: DataFormat,
        payload: &[u8],
    ) -> EngineResult<()> {
        trace!("Engine data on output {out}: {kind}, {} bytes", payload.len());
        let targets: Vec<Arc<dyn EngineDataObserver>> = {
            let observers = self.data_observers.read().unwrap();
            observers
                .iter()
                .filter(|(o, _)| *o == out)
                .map(|(_, obs)| Arc::clone(obs))
                .collect()
        };
        if targets.is_empty() {
            trace!("No data observer for output {out}, payload dropped");
            return Ok(());
        }
        let mut result = Ok(());
        for observer in targets {
            if let Err(code) = observer.on_data(out, kind, format, payload) {
                debug!("Data consumer on output {out} reported {code}");
                if result.is_ok() {
                    result = Err(code);
                }
            }
        }
        result
    }

    // --- Command forwarding (caller threads) ---

    pub fn start(&self, out: OutputId, uri: &str, extras: Option<&str>) -> EngineResult<()> {
        debug!("start: output {out}, uri {uri}, extras {extras:?}");
        self.backend.start(out, uri, extras)
    }

    pub fn stop(&self, out: OutputId) -> EngineResult<()> {
        debug!("stop: output {out}");
        self.backend.stop(out)
    }

    pub fn buffer(&self, out: OutputId, start: bool) -> EngineResult<()> {
        debug!("buffer: output {out}, start {start}");
        self.backend.buffer(out, start)
    }

    pub fn trick_play(&self, out: OutputId, offset_secs: i64, speed: i16) -> EngineResult<()> {
        debug!("trick_play: output {out}, offset {offset_secs}s, speed {speed}");
        self.backend.trick_play(out, offset_secs, speed)
    }

    pub fn media_description(&self, out: OutputId) -> EngineResult<MediaDescription> {
        self.backend.media_description(out)
    }

    pub fn select_track(&self, out: OutputId, id: u32, on: bool) -> EngineResult<()> {
        debug!("select_track: output {out}, track {id}, on {on}");
        self.backend.select_track(out, id, on)
    }

    pub fn set_teletext_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.backend.set_teletext_enabled(out, enable)
    }

    pub fn set_teletext_page(&self, out: OutputId, page: u16, subpage: u16) -> EngineResult<()> {
        self.backend.set_teletext_page(out, page, subpage)
    }

    pub fn teletext_page(&self, out: OutputId) -> EngineResult<(u16, u16)> {
        self.backend.teletext_page(out)
    }

    pub fn teletext_linked_page(&self, out: OutputId, link: TeletextLink) -> EngineResult<u16> {
        self.backend.teletext_linked_page(out, link)
    }

    pub fn set_teletext_transparency(&self, out: OutputId, alpha: u8) -> EngineResult<()> {
        self.backend.set_teletext_transparency(out, alpha)
    }

    pub fn set_subtitles_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.backend.set_subtitles_enabled(out, enable)
    }

    pub fn setup_video(
        &self,
        out: OutputId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> EngineResult<()> {
        debug!("setup_video: output {out}, {width}x{height} at ({x},{y})");
        self.backend.setup_video(out, x, y, width, height)
    }

    pub fn set_audio_passthrough(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.backend.set_audio_passthrough(out, enable)
    }

    pub fn set_volume_leveling(
        &self,
        out: OutputId,
        enable: bool,
        level: VolumeLevel,
    ) -> EngineResult<()> {
        self.backend.set_volume_leveling(out, enable, level)
    }
}
