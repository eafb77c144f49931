//! Session configuration
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


use crate::track::LocalTrack;
use std::fmt;
use std::time::Duration;
use webrtc::track::track_local::TrackLocal;

/// Default signaling endpoint
pub const DEFAULT_BASE_URL: &str = "https://signaling.rtc.qcloud.com";

/// Default bound on each signaling request
pub const DEFAULT_SIGNALING_TIMEOUT_MS: u64 = 10_000;

/// Signaling endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingConfig {
    /// Base URL; offers go to `{base_url}/v1/push/{stream_id}`
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl SignalingConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_SIGNALING_TIMEOUT_MS,
        }
    }
}

/// Publish session configuration
///
/// A supplied track is only used when its media kind is enabled; enabled
/// kinds without a supplied track get a placeholder track.
#[derive(Clone, Default)]
pub struct SessionConfig {
    /// Application identifier (`sdkappid`)
    pub sdk_app_id: u32,
    /// Shared secret of the application
    pub secret: String,
    pub audio: bool,
    pub video: bool,
    pub audio_track: Option<LocalTrack>,
    pub video_track: Option<LocalTrack>,
    pub signaling: SignalingConfig,
}

impl SessionConfig {
    pub fn new(sdk_app_id: u32, secret: impl Into<String>) -> Self {
        Self {
            sdk_app_id,
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }

    pub fn with_video(mut self, enabled: bool) -> Self {
        self.video = enabled;
        self
    }

    pub fn with_audio_track(mut self, track: LocalTrack) -> Self {
        self.audio_track = Some(track);
        self
    }

    pub fn with_video_track(mut self, track: LocalTrack) -> Self {
        self.video_track = Some(track);
        self
    }

    pub fn with_signaling(mut self, signaling: SignalingConfig) -> Self {
        self.signaling = signaling;
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("sdk_app_id", &self.sdk_app_id)
            .field("secret", &"<redacted>")
            .field("audio", &self.audio)
            .field("video", &self.video)
            .field("audio_track", &self.audio_track.as_ref().map(|t| t.id().to_string()))
            .field("video_track", &self.video_track.as_ref().map(|t| t.id().to_string()))
            .field("signaling", &self.signaling)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signaling_defaults() {
        let config = SignalingConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SessionConfig::new(1400540319, "top-secret").with_audio(true);
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("top-secret"));
    }
}
