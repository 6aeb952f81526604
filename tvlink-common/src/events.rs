//! Event types delivered by the native engine
//!
//! Every callback from the engine is tagged with the originating output and
//! one of the payload categories below. The coordination core fans these out
//! to per-output observers; it never synthesizes engine events of its own.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Playback lifecycle state of one output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    #[default]
    Stopped,
    Transitioning,
    Buffering,
    Playing,
    Paused,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Stopped => write!(f, "stopped"),
            PlayerState::Transitioning => write!(f, "transitioning"),
            PlayerState::Buffering => write!(f, "buffering"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Paused => write!(f, "paused"),
        }
    }
}

/// Play position report (all positions in seconds of stream time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInfo {
    /// First reachable position (moves forward on live/timeshift streams)
    pub begin: u64,
    /// Current play position
    pub position: u64,
    /// Last reachable position
    pub end: u64,
    /// Current playback speed (1 = normal, 0 = paused, negative = reverse)
    pub speed: i16,
}

/// Buffer/stream boundary notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    BeginOfStream,
    EndOfStream,
    HighWatermark,
    LowWatermark,
}

/// Connection state of the stream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Why a connection state change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionReason {
    User,
    WriteError,
    ReadError,
    DrmError,
    ServerError,
}

/// Connection state change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionChange {
    pub state: ConnectionState,
    pub reason: ConnectionReason,
}

/// Side-channel payload kinds carried over the engine data callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Teletext,
    Subtitles,
    HbbTv,
    Dsmcc,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Teletext => write!(f, "teletext"),
            DataKind::Subtitles => write!(f, "subtitles"),
            DataKind::HbbTv => write!(f, "hbbtv"),
            DataKind::Dsmcc => write!(f, "dsmcc"),
        }
    }
}

/// Encoding of a side-channel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Json,
    Raw,
}

/// Engine callback payload, tagged by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// Playback lifecycle state changed
    StateChange { state: PlayerState },

    /// Play position report
    PlayInfo { info: PlayInfo },

    /// Runtime error on this output
    Error { code: ErrorCode },

    /// Buffer/stream boundary notification
    PlaybackStatus { status: PlaybackStatus },

    /// Stream source connection changed
    ConnectionChange { change: ConnectionChange },
}

impl EngineEvent {
    /// Get event category as string for logging and filtering
    pub fn event_type(&self) -> &str {
        match self {
            EngineEvent::StateChange { .. } => "StateChange",
            EngineEvent::PlayInfo { .. } => "PlayInfo",
            EngineEvent::Error { .. } => "Error",
            EngineEvent::PlaybackStatus { .. } => "PlaybackStatus",
            EngineEvent::ConnectionChange { .. } => "ConnectionChange",
        }
    }
}
