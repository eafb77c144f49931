//! Local track resolution
//!
//! Decides which audio/video tracks a session publishes: caller-supplied
//! tracks are used unchanged, enabled kinds without one get a placeholder
//! sample track bound to the session's stream id.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_H264, MIME_TYPE_OPUS};
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_local::TrackLocal;

/// Shared handle to any local track the engine can send
pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// Media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Codec of placeholder tracks of this kind
    pub fn capability(&self) -> RTCRtpCodecCapability {
        match self {
            MediaKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            MediaKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_H264.to_owned(),
                clock_rate: 90000,
                channels: 0,
                ..Default::default()
            },
        }
    }

    pub fn codec_type(&self) -> RTPCodecType {
        match self {
            MediaKind::Audio => RTPCodecType::Audio,
            MediaKind::Video => RTPCodecType::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved track and who owns it
#[derive(Clone)]
pub enum TrackHandle {
    /// Created by the session; released at teardown
    Owned(Arc<TrackLocalStaticSample>),
    /// Supplied by the caller; never released by the session
    Supplied(LocalTrack),
}

impl TrackHandle {
    /// Track as the engine consumes it
    pub fn as_local(&self) -> LocalTrack {
        match self {
            TrackHandle::Owned(track) => Arc::clone(track) as LocalTrack,
            TrackHandle::Supplied(track) => Arc::clone(track),
        }
    }

    /// Sample writer of a session-created track
    pub fn sample_track(&self) -> Option<&Arc<TrackLocalStaticSample>> {
        match self {
            TrackHandle::Owned(track) => Some(track),
            TrackHandle::Supplied(_) => None,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, TrackHandle::Owned(_))
    }

    pub fn id(&self) -> &str {
        match self {
            TrackHandle::Owned(track) => track.id(),
            TrackHandle::Supplied(track) => track.id(),
        }
    }

    pub fn stream_id(&self) -> &str {
        match self {
            TrackHandle::Owned(track) => track.stream_id(),
            TrackHandle::Supplied(track) => track.stream_id(),
        }
    }
}

impl fmt::Debug for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = if self.is_owned() { "Owned" } else { "Supplied" };
        f.debug_struct(variant)
            .field("id", &self.id())
            .field("stream_id", &self.stream_id())
            .finish()
    }
}

/// Audio/video tracks of one session
#[derive(Debug)]
pub struct TrackRegistry {
    stream_id: String,
    audio: Option<TrackHandle>,
    video: Option<TrackHandle>,
}

impl TrackRegistry {
    /// Resolve tracks from the configuration
    ///
    /// A fresh stream id is generated per call; it is shared by every
    /// placeholder track of the session.
    pub fn resolve(config: &SessionConfig) -> SessionResult<Self> {
        let stream_id = Uuid::new_v4().to_string();

        let audio = if config.audio {
            Some(Self::resolve_kind(MediaKind::Audio, config.audio_track.as_ref(), &stream_id)?)
        } else {
            None
        };

        let video = if config.video {
            Some(Self::resolve_kind(MediaKind::Video, config.video_track.as_ref(), &stream_id)?)
        } else {
            None
        };

        Ok(TrackRegistry {
            stream_id,
            audio,
            video,
        })
    }

    fn resolve_kind(
        kind: MediaKind,
        supplied: Option<&LocalTrack>,
        stream_id: &str,
    ) -> SessionResult<TrackHandle> {
        if let Some(track) = supplied {
            if track.kind() != kind.codec_type() {
                return Err(SessionError::Configuration(format!(
                    "supplied {} track {} has kind {:?}",
                    kind,
                    track.id(),
                    track.kind()
                )));
            }
            debug!(kind = %kind, track_id = track.id(), "Using supplied track");
            return Ok(TrackHandle::Supplied(Arc::clone(track)));
        }

        let track_id = Uuid::new_v4().to_string();
        let capability = kind.capability();

        debug!(
            kind = %kind,
            track_id = %track_id,
            stream_id = stream_id,
            mime_type = %capability.mime_type,
            "Creating placeholder track"
        );

        Ok(TrackHandle::Owned(Arc::new(TrackLocalStaticSample::new(
            capability,
            track_id,
            stream_id.to_string(),
        ))))
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn audio(&self) -> Option<&TrackHandle> {
        self.audio.as_ref()
    }

    pub fn video(&self) -> Option<&TrackHandle> {
        self.video.as_ref()
    }

    /// Resolved tracks, audio first
    pub fn tracks(&self) -> impl Iterator<Item = (MediaKind, &TrackHandle)> {
        self.audio
            .iter()
            .map(|t| (MediaKind::Audio, t))
            .chain(self.video.iter().map(|t| (MediaKind::Video, t)))
    }

    /// Drop session-created tracks, keeping supplied ones
    ///
    /// Returns how many tracks were released.
    pub fn release_owned(&mut self) -> usize {
        let mut released = 0;
        for slot in [&mut self.audio, &mut self.video] {
            if slot.as_ref().is_some_and(TrackHandle::is_owned) {
                *slot = None;
                released += 1;
            }
        }
        released
    }
}
