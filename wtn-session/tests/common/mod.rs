//! Shared fixtures for session tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use wtn_session::{
    EngineStateHandler, LocalTrack, MediaKind, RTCPeerConnectionState, SessionConfig,
    SessionDescription, SessionError, SessionResult, SignalingConfig, TransportEngine,
};

pub const APP_ID: u32 = 1400540319;
pub const SECRET: &str = "5d99bf9896c066b59c907038788fc0706ee822bcd6cd12bb067132c9665ce576";

/// Engine that records calls and lets tests fire state events
#[derive(Default)]
pub struct MockEngine {
    attached: Mutex<Vec<LocalTrack>>,
    local: Mutex<Option<SessionDescription>>,
    remote: Mutex<Option<SessionDescription>>,
    handler: Mutex<Option<EngineStateHandler>>,
    closed: AtomicBool,
    pub fail_attach: AtomicBool,
    pub reject_answer: AtomicBool,
    pub fail_close: AtomicBool,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attached(&self) -> Vec<LocalTrack> {
        self.attached.lock().unwrap().clone()
    }

    pub fn attached_kinds(&self) -> Vec<RTPCodecType> {
        self.attached().iter().map(|t| t.kind()).collect()
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.local.lock().unwrap().clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.remote.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Deliver an engine event the way the engine's own task would
    pub fn emit(&self, state: RTCPeerConnectionState) {
        let handler = self.handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(state);
        }
    }
}

#[async_trait]
impl TransportEngine for MockEngine {
    async fn attach_send_only_track(&self, track: LocalTrack) -> SessionResult<()> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(SessionError::Engine("transceiver limit reached".to_string()));
        }
        self.attached.lock().unwrap().push(track);
        Ok(())
    }

    async fn create_offer(&self) -> SessionResult<SessionDescription> {
        let mut sdp = String::from("v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n");
        for track in self.attached() {
            let kind = match track.kind() {
                RTPCodecType::Audio => "audio 9 UDP/TLS/RTP/SAVPF 111",
                _ => "video 9 UDP/TLS/RTP/SAVPF 102",
            };
            sdp.push_str(&format!(
                "m={}\r\na=sendonly\r\na=msid:{} {}\r\n",
                kind,
                track.stream_id(),
                track.id()
            ));
        }
        Ok(SessionDescription::offer(sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> SessionResult<()> {
        *self.local.lock().unwrap() = Some(description);
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> SessionResult<()> {
        if self.reject_answer.load(Ordering::SeqCst) {
            return Err(SessionError::Negotiation("answer has no media".to_string()));
        }
        *self.remote.lock().unwrap() = Some(description);
        Ok(())
    }

    fn on_connection_state_change(&self, handler: EngineStateHandler) {
        *self.handler.lock().unwrap() = Some(handler);
    }

    async fn close(&self) -> SessionResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(SessionError::Engine("close failed".to_string()));
        }
        Ok(())
    }
}

pub fn config_for(base_url: &str) -> SessionConfig {
    SessionConfig::new(APP_ID, SECRET).with_signaling(SignalingConfig::new(base_url))
}

pub fn caller_track(kind: MediaKind, id: &str) -> LocalTrack {
    Arc::new(TrackLocalStaticSample::new(
        kind.capability(),
        id.to_string(),
        "camera-stream".to_string(),
    ))
}
