//! # TVLINK Common Library
//!
//! Shared vocabulary for the TVLINK playback stack:
//! - Error taxonomy (caller-facing errors and engine error codes)
//! - Event types delivered by the native engine
//! - Media description model (tracks, codecs, teletext pages)
//! - Clock time utilities

pub mod error;
pub mod events;
pub mod media;
pub mod time;

pub use error::{Error, ErrorCode, Result};
pub use time::ClockTime;
