//! Media description model
//!
//! Track variants are a tagged union keyed by media kind; each variant
//! carries only the fields that exist for that kind. The description is
//! produced by the native engine and cached by the playback coordinator.

use serde::{Deserialize, Serialize};

/// Stream container reported by the demuxer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    #[default]
    None,
    MpegTs,
    Mp4,
}

/// Elementary stream codecs known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    Mpeg1,
    Mpeg2,
    Mpeg4,
    H264,
    H265,
    Wmv,
    Mp1,
    Mp2,
    Mp3,
    Aac,
    HeAac,
    Ac3,
    Eac3,
    Dts,
    Lpcm,
    Wma,
    Teletext,
    DvbSubtitles,
    ClosedCaption,
    Clock,
    HbbTv,
    DsmccA,
    DsmccB,
    DsmccC,
    DsmccD,
    Unknown,
}

/// Broad media kind of a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Data,
}

impl Codec {
    /// Broad kind of this codec, or None for [`Codec::Unknown`].
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Codec::Mpeg1 | Codec::Mpeg2 | Codec::Mpeg4 | Codec::H264 | Codec::H265
            | Codec::Wmv => Some(MediaKind::Video),
            Codec::Mp1 | Codec::Mp2 | Codec::Mp3 | Codec::Aac | Codec::HeAac | Codec::Ac3
            | Codec::Eac3 | Codec::Dts | Codec::Lpcm | Codec::Wma => Some(MediaKind::Audio),
            Codec::Teletext | Codec::DvbSubtitles | Codec::ClosedCaption | Codec::Clock
            | Codec::HbbTv | Codec::DsmccA | Codec::DsmccB | Codec::DsmccC | Codec::DsmccD => {
                Some(MediaKind::Data)
            }
            Codec::Unknown => None,
        }
    }
}

/// Purpose of a teletext page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeletextPageKind {
    InitialPage,
    Subtitles,
    Info,
    Schedule,
    ClosedCaption,
}

/// One teletext page advertised by a teletext track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeletextPage {
    pub kind: TeletextPageKind,
    /// ISO-639 language code
    pub lang: String,
    pub page: u16,
}

/// Kind-specific track fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrackDetail {
    Video {
        width: u32,
        height: u32,
    },
    Audio {
        /// ISO-639 language code
        lang: String,
        sample_rate: u32,
        channels: u16,
    },
    Subtitles {
        /// ISO-639 language code
        lang: String,
    },
    Teletext {
        pages: Vec<TeletextPage>,
    },
    /// Data track with no kind-specific attributes (HbbTV, DSMCC, clock)
    Data,
}

/// One elementary stream in a media description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Engine-assigned track identifier, used for select/deselect
    pub id: u32,
    pub codec: Codec,
    /// True if the engine is currently presenting this track
    pub selected: bool,
    pub detail: TrackDetail,
}

/// Full description of the currently playing media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescription {
    pub container: Container,
    pub tracks: Vec<MediaTrack>,
}

impl MediaDescription {
    /// Tracks whose codec maps to the given media kind.
    pub fn tracks_of(&self, kind: MediaKind) -> impl Iterator<Item = &MediaTrack> {
        self.tracks
            .iter()
            .filter(move |t| t.codec.kind() == Some(kind))
    }

    /// The selected track of the given kind, if any.
    pub fn selected(&self, kind: MediaKind) -> Option<&MediaTrack> {
        self.tracks_of(kind).find(|t| t.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_description() -> MediaDescription {
        MediaDescription {
            container: Container::MpegTs,
            tracks: vec![
                MediaTrack {
                    id: 101,
                    codec: Codec::H264,
                    selected: true,
                    detail: TrackDetail::Video {
                        width: 1920,
                        height: 1080,
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
                        lang: "fra".to_string(),
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
                            kind: TeletextPageKind::InitialPage,
                            lang: "ger".to_string(),
                            page: 100,
                        }],
                    },
                },
            ],
        }
    }

    #[test]
    fn test_codec_kind_classification() {
        assert_eq!(Codec::H265.kind(), Some(MediaKind::Video));
        assert_eq!(Codec::HeAac.kind(), Some(MediaKind::Audio));
        assert_eq!(Codec::DvbSubtitles.kind(), Some(MediaKind::Data));
        assert_eq!(Codec::DsmccB.kind(), Some(MediaKind::Data));
        assert_eq!(Codec::Unknown.kind(), None);
    }

    #[test]
    fn test_tracks_of_filters_by_kind() {
        let desc = sample_description();
        let audio_ids: Vec<u32> = desc.tracks_of(MediaKind::Audio).map(|t| t.id).collect();
        assert_eq!(audio_ids, vec![201, 202]);
        assert_eq!(desc.tracks_of(MediaKind::Video).count(), 1);
        assert_eq!(desc.tracks_of(MediaKind::Data).count(), 1);
    }

    #[test]
    fn test_selected_track_per_kind() {
        let desc = sample_description();
        assert_eq!(desc.selected(MediaKind::Audio).map(|t| t.id), Some(201));
        assert_eq!(desc.selected(MediaKind::Video).map(|t| t.id), Some(101));
        assert!(desc.selected(MediaKind::Data).is_none());
    }

    #[test]
    fn test_track_detail_serializes_tagged() {
        let desc = sample_description();
        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains("\"kind\":\"video\""));
        assert!(json.contains("\"kind\":\"teletext\""));

        let back: MediaDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
