//! Transport engine seam
//!
//! The session drives connection establishment through this trait and never
//! touches ICE/DTLS/SRTP itself. [`WebRtcEngine`](crate::webrtc_engine::WebRtcEngine)
//! is the production implementation.
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


use crate::error::SessionResult;
use crate::track::LocalTrack;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Session description type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpType::Offer => f.write_str("offer"),
            SdpType::Answer => f.write_str("answer"),
        }
    }
}

/// SDP document exchanged with the signaling server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Callback receiving engine-native connection state changes
pub type EngineStateHandler = Arc<dyn Fn(RTCPeerConnectionState) + Send + Sync>;

/// Negotiation policy fixed at engine creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePolicy {
    /// STUN/TURN URLs; empty by default
    pub ice_servers: Vec<String>,
    /// Bundle every media section onto one transport
    pub max_bundle: bool,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            ice_servers: Vec::new(),
            max_bundle: true,
        }
    }
}

/// Real-time transport engine operations used by a publish session
///
/// State-change handlers run on the engine's own tasks, concurrently with
/// the caller of the other methods.
#[async_trait]
pub trait TransportEngine: Send + Sync {
    /// Attach a local track on a send-only transceiver
    async fn attach_send_only_track(&self, track: LocalTrack) -> SessionResult<()>;

    /// Generate a local offer
    async fn create_offer(&self) -> SessionResult<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> SessionResult<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> SessionResult<()>;

    /// Replace the connection state handler
    fn on_connection_state_change(&self, handler: EngineStateHandler);

    /// Release the connection and all transports
    async fn close(&self) -> SessionResult<()>;
}
