//! Shared test fixtures: a recording engine backend and recording observers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tvlink_common::events::{
    ConnectionChange, DataFormat, DataKind, PlayInfo, PlaybackStatus, PlayerState,
};
use tvlink_common::media::{
    Codec, Container, MediaDescription, MediaTrack, TeletextPage, TeletextPageKind, TrackDetail,
};
use tvlink_common::ErrorCode;
use tvlink_player::{
    DataConsumer, EngineBackend, EngineResult, OutputId, PlayerObserver, TeletextLink, VolumeLevel,
};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Recording in-memory engine. Every command appends one line to `calls`;
/// `fail_next` makes exactly the next gated command fail with the given
/// code.
pub struct FakeEngine {
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<ErrorCode>>,
    media: Mutex<MediaDescription>,
    pub init_calls: AtomicUsize,
    pub media_fetches: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeEngine {
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            media: Mutex::new(sample_media()),
            init_calls: AtomicUsize::new(0),
            media_fetches: AtomicUsize::new(0),
        })
    }

    pub fn fail_next(&self, code: ErrorCode) {
        *self.fail_next.lock().unwrap() = Some(code);
    }

    pub fn set_media(&self, desc: MediaDescription) {
        *self.media.lock().unwrap() = desc;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn gate(&self) -> EngineResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }
}

impl EngineBackend for FakeEngine {
    fn init(&self) -> EngineResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.gate()
    }

    fn deinit(&self) -> EngineResult<()> {
        self.record("deinit".to_string());
        Ok(())
    }

    fn version(&self) -> String {
        "fake-engine 1.0".to_string()
    }

    fn start(&self, out: OutputId, uri: &str, extras: Option<&str>) -> EngineResult<()> {
        self.record(format!("start {out} {uri} {}", extras.unwrap_or("-")));
        self.gate()
    }

    fn stop(&self, out: OutputId) -> EngineResult<()> {
        self.record(format!("stop {out}"));
        self.gate()
    }

    fn buffer(&self, out: OutputId, start: bool) -> EngineResult<()> {
        self.record(format!("buffer {out} {start}"));
        self.gate()
    }

    fn trick_play(&self, out: OutputId, offset_secs: i64, speed: i16) -> EngineResult<()> {
        self.record(format!("trick_play {out} {offset_secs} {speed}"));
        self.gate()
    }

    fn media_description(&self, out: OutputId) -> EngineResult<MediaDescription> {
        self.record(format!("media_description {out}"));
        self.media_fetches.fetch_add(1, Ordering::SeqCst);
        self.gate()?;
        Ok(self.media.lock().unwrap().clone())
    }

    fn select_track(&self, out: OutputId, id: u32, on: bool) -> EngineResult<()> {
        self.record(format!("select_track {out} {id} {on}"));
        self.gate()
    }

    fn set_teletext_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.record(format!("set_teletext_enabled {out} {enable}"));
        self.gate()
    }

    fn set_teletext_page(&self, out: OutputId, page: u16, subpage: u16) -> EngineResult<()> {
        self.record(format!("set_teletext_page {out} {page} {subpage}"));
        self.gate()
    }

    fn teletext_page(&self, out: OutputId) -> EngineResult<(u16, u16)> {
        self.record(format!("teletext_page {out}"));
        self.gate()?;
        Ok((100, 0))
    }

    fn teletext_linked_page(&self, out: OutputId, link: TeletextLink) -> EngineResult<u16> {
        self.record(format!("teletext_linked_page {out} {link:?}"));
        self.gate()?;
        Ok(match link {
            TeletextLink::NextPage => 101,
            TeletextLink::PreviousPage => 99,
            _ => 200,
        })
    }

    fn set_teletext_transparency(&self, out: OutputId, alpha: u8) -> EngineResult<()> {
        self.record(format!("set_teletext_transparency {out} {alpha}"));
        self.gate()
    }

    fn set_subtitles_enabled(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.record(format!("set_subtitles_enabled {out} {enable}"));
        self.gate()
    }

    fn setup_video(
        &self,
        out: OutputId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> EngineResult<()> {
        self.record(format!("setup_video {out} {x} {y} {width} {height}"));
        self.gate()
    }

    fn set_audio_passthrough(&self, out: OutputId, enable: bool) -> EngineResult<()> {
        self.record(format!("set_audio_passthrough {out} {enable}"));
        self.gate()
    }

    fn set_volume_leveling(
        &self,
        out: OutputId,
        enable: bool,
        level: VolumeLevel,
    ) -> EngineResult<()> {
        self.record(format!("set_volume_leveling {out} {enable} {level:?}"));
        self.gate()
    }
}

/// Player observer that records everything it receives.
#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<PlayerState>>,
    pub errors: Mutex<Vec<ErrorCode>>,
    pub play_infos: Mutex<Vec<PlayInfo>>,
    pub playback_statuses: Mutex<Vec<PlaybackStatus>>,
    pub connections: Mutex<Vec<ConnectionChange>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingObserver::default())
    }

    pub fn states(&self) -> Vec<PlayerState> {
        self.states.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<ErrorCode> {
        self.errors.lock().unwrap().clone()
    }

    pub fn play_infos(&self) -> Vec<PlayInfo> {
        self.play_infos.lock().unwrap().clone()
    }

    pub fn playback_statuses(&self) -> Vec<PlaybackStatus> {
        self.playback_statuses.lock().unwrap().clone()
    }

    pub fn connections(&self) -> Vec<ConnectionChange> {
        self.connections.lock().unwrap().clone()
    }
}

impl PlayerObserver for RecordingObserver {
    fn on_state_changed(&self, state: PlayerState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_play_info(&self, info: &PlayInfo) {
        self.play_infos.lock().unwrap().push(*info);
    }

    fn on_playback_status(&self, status: PlaybackStatus) {
        self.playback_statuses.lock().unwrap().push(status);
    }

    fn on_error(&self, code: ErrorCode) {
        self.errors.lock().unwrap().push(code);
    }

    fn on_connection_changed(&self, change: &ConnectionChange) {
        self.connections.lock().unwrap().push(*change);
    }
}

/// Data consumer that records payloads; optionally reports a fixed failure.
pub struct RecordingConsumer {
    pub payloads: Mutex<Vec<(DataKind, DataFormat, Vec<u8>)>>,
    pub fail_with: Option<ErrorCode>,
}

impl RecordingConsumer {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingConsumer {
            payloads: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    pub fn failing(code: ErrorCode) -> Arc<Self> {
        Arc::new(RecordingConsumer {
            payloads: Mutex::new(Vec::new()),
            fail_with: Some(code),
        })
    }

    pub fn payloads(&self) -> Vec<(DataKind, DataFormat, Vec<u8>)> {
        self.payloads.lock().unwrap().clone()
    }
}

impl DataConsumer for RecordingConsumer {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()> {
        self.payloads
            .lock()
            .unwrap()
            .push((kind, format, payload.to_vec()));
        match self.fail_with {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }
}

/// Typical broadcast service: one video, two audio, one teletext track.
pub fn sample_media() -> MediaDescription {
    MediaDescription {
        container: Container::MpegTs,
        tracks: vec![
            MediaTrack {
                id: 101,
                codec: Codec::H264,
                selected: true,
                detail: TrackDetail::Video {
                    width: 1280,
                    height: 720,
                },
            },
            MediaTrack {
                id: 201,
                codec: Codec::Aac,
                selected: true,
                detail: TrackDetail::Audio {
                    lang: "ger".to_string(),
                    sample_rate: 48000,
                    channels: 2,
                },
            },
            MediaTrack {
                id: 202,
                codec: Codec::Ac3,
                selected: false,
                detail: TrackDetail::Audio {
                    lang: "eng".to_string(),
                    sample_rate: 48000,
                    channels: 6,
                },
            },
            MediaTrack {
                id: 301,
                codec: Codec::Teletext,
                selected: false,
                detail: TrackDetail::Teletext {
                    pages: vec![TeletextPage {
                        kind: TeletextPageKind::Subtitles,
                        lang: "ger".to_string(),
                        page: 777,
                    }],
                },
            },
        ],
    }
}
