//! # TVLINK Player Library (tvlink-player)
//!
//! Playback coordination core between application code and a native
//! audio/video decoding engine.
//!
//! **Purpose:** Serialize playback commands per output against the single
//! shared engine, fan engine callbacks out to the observers of the matching
//! output, and demultiplex typed side-channel data (teletext, subtitles,
//! HbbTV, DSMCC) to independent consumers.
//!
//! **Architecture:** One [`EngineGateway`] per process owning the native
//! boundary, one [`Player`] state machine per output, lock-protected status
//! snapshots with one-shot event fields. No async runtime: concurrency comes
//! from caller threads and the engine-owned callback thread.

pub mod coordinator;
pub mod datafeed;
pub mod engine;
pub mod feeds;
pub mod gateway;
pub mod output;
pub mod status;

pub use coordinator::{Player, PlayerObserver, CURRENT_POSITION, NORMAL_SPEED, PAUSE_SPEED};
pub use datafeed::{DataConsumer, DataFeed};
pub use engine::{EngineBackend, EngineResult, TeletextLink, VolumeLevel};
pub use feeds::{
    DsmccFeed, DsmccListener, HbbTvFeed, HbbTvListener, SubtitlesFeed, SubtitlesListener,
    TeletextFeed, TeletextListener,
};
pub use gateway::{EngineDataObserver, EngineGateway, EngineObserver};
pub use output::OutputId;
pub use status::{StatusSnapshot, Transient};
pub use tvlink_common::{Error, ErrorCode, Result};
