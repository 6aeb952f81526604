//! Clock time utilities
//!
//! Playback offsets are expressed as hour/minute/second wall-clock style
//! values and handed to the engine as whole seconds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A non-negative hour/minute/second offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    hour: i32,
    minute: i32,
    second: i32,
}

impl ClockTime {
    /// Create a clock time. All components must be non-negative.
    pub fn new(hour: i32, minute: i32, second: i32) -> Result<Self> {
        if hour < 0 || minute < 0 || second < 0 {
            return Err(Error::InvalidArgument(
                "time components must be non-negative".to_string(),
            ));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Split a total number of seconds into hour/minute/second components.
    pub fn from_seconds(total: i64) -> Result<Self> {
        if total < 0 {
            return Err(Error::InvalidArgument(
                "time components must be non-negative".to_string(),
            ));
        }
        let hour = total / 3600;
        let rest = total - hour * 3600;
        let minute = rest / 60;
        let second = rest - minute * 60;
        Ok(Self {
            hour: hour as i32,
            minute: minute as i32,
            second: second as i32,
        })
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn minute(&self) -> i32 {
        self.minute
    }

    pub fn second(&self) -> i32 {
        self.second
    }

    /// Total offset in seconds, as passed to the engine.
    pub fn total_seconds(&self) -> i64 {
        self.second as i64 + self.minute as i64 * 60 + self.hour as i64 * 3600
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)
    }
}
