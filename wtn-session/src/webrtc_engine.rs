//! WebRTC transport engine
//!
//! Wraps an `RTCPeerConnection` from the `webrtc` crate. The crate negotiates
//! with unified-plan semantics only, so the policy carries no SDP semantics
//! switch.
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


use crate::engine::{EnginePolicy, EngineStateHandler, SdpType, SessionDescription, TransportEngine};
use crate::error::{SessionError, SessionResult};
use crate::track::LocalTrack;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

/// Transport engine backed by a WebRTC peer connection
pub struct WebRtcEngine {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcEngine {
    /// Create a peer connection with the given policy
    pub async fn new(policy: &EnginePolicy) -> SessionResult<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| SessionError::Configuration(format!("Failed to register codecs: {}", e)))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| {
                SessionError::Configuration(format!("Failed to register interceptors: {}", e))
            })?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: policy
                .ice_servers
                .iter()
                .map(|url| RTCIceServer {
                    urls: vec![url.clone()],
                    ..Default::default()
                })
                .collect(),
            bundle_policy: if policy.max_bundle {
                RTCBundlePolicy::MaxBundle
            } else {
                RTCBundlePolicy::Balanced
            },
            ..Default::default()
        };

        let peer_connection = api.new_peer_connection(rtc_config).await.map_err(|e| {
            SessionError::Configuration(format!("Failed to create peer connection: {}", e))
        })?;

        info!(
            ice_servers = policy.ice_servers.len(),
            max_bundle = policy.max_bundle,
            "Created WebRTC peer connection"
        );

        Ok(Self {
            peer_connection: Arc::new(peer_connection),
        })
    }

    /// Underlying peer connection, for stats and diagnostics
    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

fn to_rtc(description: SessionDescription) -> SessionResult<RTCSessionDescription> {
    let parsed = match description.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(description.sdp),
        SdpType::Answer => RTCSessionDescription::answer(description.sdp),
    };
    parsed.map_err(|e| {
        SessionError::Negotiation(format!("Invalid {} SDP: {}", description.sdp_type, e))
    })
}

#[async_trait]
impl TransportEngine for WebRtcEngine {
    async fn attach_send_only_track(&self, track: LocalTrack) -> SessionResult<()> {
        let track_id = track.id().to_string();
        self.peer_connection
            .add_transceiver_from_track(
                track,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Sendonly,
                    send_encodings: vec![],
                }),
            )
            .await
            .map_err(|e| SessionError::Engine(format!("Failed to add transceiver: {}", e)))?;

        debug!(track_id = %track_id, "Attached send-only transceiver");
        Ok(())
    }

    async fn create_offer(&self) -> SessionResult<SessionDescription> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| SessionError::Negotiation(format!("Failed to create offer: {}", e)))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> SessionResult<()> {
        let description = to_rtc(description)?;
        self.peer_connection
            .set_local_description(description)
            .await
            .map_err(|e| {
                SessionError::Negotiation(format!("Failed to set local description: {}", e))
            })
    }

    async fn set_remote_description(&self, description: SessionDescription) -> SessionResult<()> {
        let description = to_rtc(description)?;
        self.peer_connection
            .set_remote_description(description)
            .await
            .map_err(|e| {
                SessionError::Negotiation(format!("Failed to set remote description: {}", e))
            })
    }

    fn on_connection_state_change(&self, handler: EngineStateHandler) {
        self.peer_connection
            .on_peer_connection_state_change(Box::new(move |state| {
                handler(state);
                Box::pin(async {})
            }));
    }

    async fn close(&self) -> SessionResult<()> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| SessionError::Engine(format!("Failed to close peer connection: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{MediaKind, TrackHandle};
    use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

    fn placeholder(kind: MediaKind) -> LocalTrack {
        TrackHandle::Owned(Arc::new(TrackLocalStaticSample::new(
            kind.capability(),
            format!("{}-track", kind),
            "engine-test".to_string(),
        )))
        .as_local()
    }

    #[tokio::test]
    async fn test_offer_has_both_media_sections() {
        let engine = WebRtcEngine::new(&EnginePolicy::default()).await.unwrap();
        engine.attach_send_only_track(placeholder(MediaKind::Audio)).await.unwrap();
        engine.attach_send_only_track(placeholder(MediaKind::Video)).await.unwrap();

        let offer = engine.create_offer().await.unwrap();
        assert_eq!(offer.sdp_type, SdpType::Offer);
        assert!(offer.sdp.contains("m=audio"));
        assert!(offer.sdp.contains("m=video"));
        assert!(offer.sdp.contains("a=sendonly"));

        engine.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_answer_is_negotiation_error() {
        let engine = WebRtcEngine::new(&EnginePolicy::default()).await.unwrap();
        let err = engine
            .set_remote_description(SessionDescription::answer("not sdp"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Negotiation(_)));

        engine.close().await.unwrap();
    }
}
