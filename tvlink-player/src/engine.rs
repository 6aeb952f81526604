//! Native engine boundary
//!
//! [`EngineBackend`] is the opaque command surface of the native
//! decoding/demuxing engine. Implementations typically wrap an FFI layer;
//! this core only relies on the trait. Commands are synchronous, return in
//! engine-defined bounded time, and either succeed or report one
//! [`ErrorCode`]. No command retries internally.
//!
//! Callbacks travel the other way: the engine driver owns a thread that
//! calls [`EngineGateway::dispatch_event`](crate::gateway::EngineGateway::dispatch_event)
//! and [`dispatch_data`](crate::gateway::EngineGateway::dispatch_data).

use serde::{Deserialize, Serialize};
use tvlink_common::media::MediaDescription;
use tvlink_common::ErrorCode;

use crate::output::OutputId;

/// Result type at the native boundary.
pub type EngineResult<T> = std::result::Result<T, ErrorCode>;

/// Volume leveling intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    Light,
    Normal,
    Heavy,
}

/// Teletext page links the engine can resolve relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeletextLink {
    NextPage,
    PreviousPage,
    NextSubpage,
    PreviousSubpage,
    Red,
    Green,
    Blue,
    Yellow,
}

/// Command surface of the native engine.
///
/// Implementations must be callable from any thread; the gateway issues
/// commands from caller threads while the engine delivers callbacks from its
/// own thread.
pub trait EngineBackend: Send + Sync {
    /// Bring the engine up. Called once by the gateway on construction.
    fn init(&self) -> EngineResult<()>;

    /// Tear the engine down. Called by the gateway on explicit shutdown.
    fn deinit(&self) -> EngineResult<()>;

    /// Engine version string, for diagnostics.
    fn version(&self) -> String;

    /// Start playback of `uri` on `out`. `extras` carries opaque
    /// `key=value&key=value` start parameters (e.g. position and speed).
    fn start(&self, out: OutputId, uri: &str, extras: Option<&str>) -> EngineResult<()>;

    /// Stop playback on `out`.
    fn stop(&self, out: OutputId) -> EngineResult<()>;

    /// Enter (`start = true`) or leave timeshift buffering on `out`.
    fn buffer(&self, out: OutputId, start: bool) -> EngineResult<()>;

    /// Jump to `offset_secs` (-1 = current position) and play at `speed`
    /// (0 = pause, 1 = normal, negative = reverse).
    fn trick_play(&self, out: OutputId, offset_secs: i64, speed: i16) -> EngineResult<()>;

    /// Describe the media currently playing on `out`.
    fn media_description(&self, out: OutputId) -> EngineResult<MediaDescription>;

    /// Select (`on = true`) or deselect an elementary stream for
    /// presentation.
    fn select_track(&self, out: OutputId, id: u32, on: bool) -> EngineResult<()>;

    fn set_teletext_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()>;

    fn set_teletext_page(&self, out: OutputId, page: u16, subpage: u16) -> EngineResult<()>;

    /// Current teletext (page, subpage).
    fn teletext_page(&self, out: OutputId) -> EngineResult<(u16, u16)>;

    /// Resolve a navigation link relative to the current teletext page.
    fn teletext_linked_page(&self, out: OutputId, link: TeletextLink) -> EngineResult<u16>;

    /// Teletext rendering transparency, 0 (opaque) to 255.
    fn set_teletext_transparency(&self, out: OutputId, alpha: u8) -> EngineResult<()>;

    fn set_subtitles_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()>;

    /// Position and size the video window of `out`.
    fn setup_video(&self, out: OutputId, x: u32, y: u32, width: u32, height: u32)
        -> EngineResult<()>;

    /// Pass compressed audio through to the sink instead of decoding.
    fn set_audio_passthrough(&self, out: OutputId, enable: bool) -> EngineResult<()>;

    fn set_volume_leveling(
        &self,
        out: OutputId,
        enable: bool,
        level: VolumeLevel,
    ) -> EngineResult<()>;
}
