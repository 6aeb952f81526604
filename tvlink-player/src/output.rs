//! Output handles
//!
//! An [`OutputId`] names one independent playback sink (e.g. one video
//! surface). It is an opaque integer identity: the gateway and coordinators
//! compare handles by value only and never own them. A handle stays valid
//! until the caller discards it; observers registered under a handle must be
//! explicitly unregistered before that happens.

use serde::{Deserialize, Serialize};

/// Identity of one independent playback sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(u32);

impl OutputId {
    /// Primary audio/video output.
    pub const MAIN_AV: OutputId = OutputId(0);

    /// Secondary audio/video output (e.g. picture-in-picture).
    pub const AUX_AV: OutputId = OutputId(1);

    pub const fn new(id: u32) -> Self {
        OutputId(id)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_compares_by_value() {
        assert_eq!(OutputId::new(0), OutputId::MAIN_AV);
        assert_eq!(OutputId::new(1), OutputId::AUX_AV);
        assert_ne!(OutputId::MAIN_AV, OutputId::AUX_AV);
    }

    #[test]
    fn test_display_is_raw_value() {
        assert_eq!(OutputId::new(7).to_string(), "7");
    }
}
