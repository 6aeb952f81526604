//! Published playback status
//!
//! [`StatusSnapshot`] is the aggregate a [`Player`](crate::Player) hands to
//! its observers on every change. The error and event fields are one-shot:
//! the coordinator sets them, notifies observers, then takes them back, so a
//! later read never replays a stale event. [`Transient`] makes that contract
//! structural instead of conventional.

use serde::Serialize;
use tvlink_common::events::{ConnectionChange, PlayInfo, PlaybackStatus, PlayerState};
use tvlink_common::ErrorCode;

/// One-shot event slot: set, delivered once, then taken back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transient<T>(Option<T>);

impl<T> Transient<T> {
    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    /// Clear the slot, returning the pending value if any.
    pub fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    /// Peek at the pending value without clearing it.
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl<T> Default for Transient<T> {
    fn default() -> Self {
        Transient(None)
    }
}

/// Aggregate playback status of one output.
///
/// `state` and `uri` are durable; `error`, `play_info`, `connection` and
/// `playback_status` are one-shot and empty again right after delivery to
/// the registered observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Current lifecycle state
    pub state: PlayerState,

    /// Last error, pending delivery
    pub error: Transient<ErrorCode>,

    /// Last play position report, pending delivery
    pub play_info: Transient<PlayInfo>,

    /// Last connection change, pending delivery
    pub connection: Transient<ConnectionChange>,

    /// Last buffer/stream boundary notification, pending delivery
    pub playback_status: Transient<PlaybackStatus>,

    /// URI of the current playback, as given by the caller
    pub uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvlink_common::events::PlayerState;

    #[test]
    fn test_transient_take_clears() {
        let mut slot = Transient::default();
        slot.set(ErrorCode::Busy);
        assert!(slot.is_set());
        assert_eq!(slot.take(), Some(ErrorCode::Busy));
        assert!(!slot.is_set());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_transient_get_does_not_clear() {
        let mut slot = Transient::default();
        slot.set(ErrorCode::NotFound);
        assert_eq!(slot.get(), Some(&ErrorCode::NotFound));
        assert!(slot.is_set());
    }

    #[test]
    fn test_snapshot_default_is_stopped_and_empty() {
        let snapshot = StatusSnapshot::default();
        assert_eq!(snapshot.state, PlayerState::Stopped);
        assert!(!snapshot.error.is_set());
        assert!(!snapshot.play_info.is_set());
        assert!(!snapshot.connection.is_set());
        assert!(!snapshot.playback_status.is_set());
        assert!(snapshot.uri.is_none());
    }

    #[test]
    fn test_snapshot_serializes_transients_flat() {
        let mut snapshot = StatusSnapshot::default();
        snapshot.error.set(ErrorCode::TimedOut);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"error\":\"timed_out\""));
        assert!(json.contains("\"state\":\"stopped\""));
    }
}
