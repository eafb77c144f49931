//! WTN Publish Session
//!
//! Client-side manager for a single outbound media publishing session:
//! - Local track resolution (caller-supplied or placeholder tracks)
//! - WHIP-style HTTP offer/answer signaling
//! - Connection state relay to a caller observer
//! - Session teardown
//!
//! Connection establishment and media transport are delegated to a
//! [`TransportEngine`]; [`WebRtcEngine`] implements it over `webrtc`.
//!
//! ```no_run
//! # async fn run() -> wtn_session::SessionResult<()> {
//! use wtn_session::{SessionConfig, SessionManager};
//!
//! let config = SessionConfig::new(1400540319, "secret").with_audio(true).with_video(true);
//! let mut session = SessionManager::new(config).await?;
//! session.on_connection_state_change(|state| println!("connection {}", state));
//! session.publish("stream01", "user01", "<usersig>").await?;
//! // ...
//! session.stop().await?;
//! # Ok(())
//! # }
//! ```
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


pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod signaling;
pub mod state;
pub mod track;
pub mod webrtc_engine;

// Re-export main types
pub use config::{
    SessionConfig, SignalingConfig, DEFAULT_BASE_URL, DEFAULT_SIGNALING_TIMEOUT_MS,
};
pub use engine::{EnginePolicy, EngineStateHandler, SdpType, SessionDescription, TransportEngine};
pub use error::{SessionError, SessionResult};
pub use session::{SessionManager, SessionPhase};
pub use signaling::{OfferResponse, SignalingClient};
pub use state::{ConnectionState, ConnectionStateMachine, StateObserver};
pub use track::{LocalTrack, MediaKind, TrackHandle, TrackRegistry};
pub use webrtc_engine::WebRtcEngine;

// Engine-native types that appear in the public API
pub use tokio_util::sync::CancellationToken;
pub use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
