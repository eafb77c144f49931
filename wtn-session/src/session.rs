//! Publish session manager
//!
//! Owns one outbound publishing session from construction to teardown:
//! resolved tracks, the transport engine, the signaling exchange and the
//! connection state relay.
//!
//! `publish` and `stop` take `&mut self`, so they can never run concurrently
//! on the same manager. Observer registration takes `&self` and may happen at
//! any time; engine state events are delivered from the engine's own tasks.
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
use crate::engine::{EnginePolicy, SessionDescription, TransportEngine};
use crate::error::{SessionError, SessionResult};
use crate::signaling::{cancellable, SignalingClient};
use crate::state::{ConnectionState, ConnectionStateMachine};
use crate::track::{TrackHandle, TrackRegistry};
use crate::webrtc_engine::WebRtcEngine;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, `publish` not called yet
    Idle,
    /// Negotiation in progress
    Publishing,
    /// Offer/answer completed
    Published,
    /// `publish` returned an error; only `stop` remains valid
    Failed,
    /// Engine closed
    Stopped,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Publishing => "publishing",
            SessionPhase::Published => "published",
            SessionPhase::Failed => "failed",
            SessionPhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Publish session manager
pub struct SessionManager {
    config: SessionConfig,
    tracks: TrackRegistry,
    engine: Arc<dyn TransportEngine>,
    signaling: SignalingClient,
    state_machine: Arc<ConnectionStateMachine>,
    phase: SessionPhase,
    /// Session resource returned by the offer, consumed by `stop`
    location: Option<String>,
    user_id: Option<String>,
    user_sig: Option<String>,
}

impl SessionManager {
    /// Create a manager over a new WebRTC engine
    ///
    /// The engine bundles all media on one transport and has no ICE servers.
    pub async fn new(config: SessionConfig) -> SessionResult<Self> {
        let engine = WebRtcEngine::new(&EnginePolicy::default()).await?;
        Self::with_engine(config, Arc::new(engine))
    }

    /// Create a manager over an existing engine
    pub fn with_engine(
        config: SessionConfig,
        engine: Arc<dyn TransportEngine>,
    ) -> SessionResult<Self> {
        let tracks = TrackRegistry::resolve(&config)?;
        let signaling = SignalingClient::new(&config.signaling, config.sdk_app_id)?;

        info!(
            sdk_app_id = config.sdk_app_id,
            audio = config.audio,
            video = config.video,
            stream_id = tracks.stream_id(),
            "Session created"
        );

        Ok(Self {
            config,
            tracks,
            engine,
            signaling,
            state_machine: Arc::new(ConnectionStateMachine::new()),
            phase: SessionPhase::Idle,
            location: None,
            user_id: None,
            user_sig: None,
        })
    }

    /// Register the connection state observer, replacing any previous one
    pub fn on_connection_state_change<F>(&self, observer: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        self.state_machine.set_observer(Arc::new(observer));
    }

    /// Publish the session's tracks to `stream_id`
    ///
    /// One-shot: a second call fails with [`SessionError::SessionState`].
    pub async fn publish(
        &mut self,
        stream_id: &str,
        user_id: &str,
        user_sig: &str,
    ) -> SessionResult<()> {
        self.publish_with_cancel(stream_id, user_id, user_sig, &CancellationToken::new())
            .await
    }

    /// Like [`publish`](Self::publish), aborting the signaling request when
    /// `cancel` fires
    pub async fn publish_with_cancel(
        &mut self,
        stream_id: &str,
        user_id: &str,
        user_sig: &str,
        cancel: &CancellationToken,
    ) -> SessionResult<()> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::SessionState(format!(
                "publish is only allowed once (session is {})",
                self.phase
            )));
        }

        self.phase = SessionPhase::Publishing;
        match self.negotiate(stream_id, user_id, user_sig, cancel).await {
            Ok(()) => {
                self.phase = SessionPhase::Published;
                info!(stream_id = stream_id, user_id = user_id, "Session published");
                Ok(())
            }
            Err(e) => {
                self.phase = SessionPhase::Failed;
                error!(stream_id = stream_id, error = %e, "Publish failed");
                Err(e)
            }
        }
    }

    async fn negotiate(
        &mut self,
        stream_id: &str,
        user_id: &str,
        user_sig: &str,
        cancel: &CancellationToken,
    ) -> SessionResult<()> {
        self.user_id = Some(user_id.to_string());
        self.user_sig = Some(user_sig.to_string());

        for (kind, track) in self.tracks.tracks() {
            self.engine
                .attach_send_only_track(track.as_local())
                .await
                .map_err(|e| e.context(&format!("attach {} track", kind)))?;
            debug!(kind = %kind, track_id = track.id(), owned = track.is_owned(), "Track attached");
        }

        let state_machine = Arc::clone(&self.state_machine);
        self.engine.on_connection_state_change(Arc::new(move |event| {
            state_machine.handle_engine_event(event);
        }));

        let offer = self
            .engine
            .create_offer()
            .await
            .map_err(|e| e.context("create offer"))?;
        self.engine
            .set_local_description(offer.clone())
            .await
            .map_err(|e| e.context("set local description"))?;

        let response = cancellable(
            cancel,
            "offer",
            self.signaling.offer(stream_id, user_id, user_sig, &offer.sdp),
        )
        .await?;
        self.location = response.location;

        self.engine
            .set_remote_description(SessionDescription::answer(response.answer_sdp))
            .await
            .map_err(|e| e.context("set remote description"))
    }

    /// End the session: delete the signaling resource, then close the engine
    ///
    /// The engine is closed even when the delete fails; the delete error is
    /// returned first. Without a session resource no request is made.
    pub async fn stop(&mut self) -> SessionResult<()> {
        self.stop_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`stop`](Self::stop), aborting the delete request when `cancel`
    /// fires
    pub async fn stop_with_cancel(&mut self, cancel: &CancellationToken) -> SessionResult<()> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Publishing => {
                return Err(SessionError::SessionState(format!(
                    "nothing to stop (session is {})",
                    self.phase
                )));
            }
            SessionPhase::Stopped => {
                return Err(SessionError::SessionState("session already stopped".to_string()));
            }
            SessionPhase::Published | SessionPhase::Failed => {}
        }

        let terminated = match self.location.take() {
            Some(location) => {
                cancellable(cancel, "terminate", self.signaling.terminate(&location)).await
            }
            None => {
                warn!("No session resource to delete");
                Err(SessionError::SessionState(
                    "no termination URL was returned by the signaling server".to_string(),
                ))
            }
        };

        let closed = self.engine.close().await;
        self.phase = SessionPhase::Stopped;
        let released = self.tracks.release_owned();
        info!(released_tracks = released, "Session stopped");

        match (terminated, closed) {
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Engine close failed after terminate error");
                }
                Err(e)
            }
            (Ok(()), closed) => closed,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Most recently delivered connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.state_machine.current()
    }

    /// Session resource URL, present between a successful offer and `stop`
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Stream id shared by session-created tracks
    pub fn stream_id(&self) -> &str {
        self.tracks.stream_id()
    }

    pub fn audio_track(&self) -> Option<&TrackHandle> {
        self.tracks.audio()
    }

    pub fn video_track(&self) -> Option<&TrackHandle> {
        self.tracks.video()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn user_sig(&self) -> Option<&str> {
        self.user_sig.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("tracks", &self.tracks)
            .field("phase", &self.phase)
            .field("location", &self.location)
            .field("user_id", &self.user_id)
            .finish()
    }
}
