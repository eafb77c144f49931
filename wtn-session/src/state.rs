//! Connection state relay
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


use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Published connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Before the first engine event
    #[default]
    New,
    Connected,
    Disconnected,
    Failed,
}

impl ConnectionState {
    /// Map an engine state; states without a counterpart yield `None`
    pub fn from_engine(state: RTCPeerConnectionState) -> Option<Self> {
        match state {
            RTCPeerConnectionState::Connected => Some(ConnectionState::Connected),
            RTCPeerConnectionState::Disconnected => Some(ConnectionState::Disconnected),
            RTCPeerConnectionState::Failed => Some(ConnectionState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::New => "new",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Observer of published state changes
pub type StateObserver = Arc<dyn Fn(ConnectionState) + Send + Sync>;

#[derive(Default)]
struct Slot {
    observer: Option<StateObserver>,
    current: ConnectionState,
}

#[derive(Default)]
pub struct ConnectionStateMachine {
    slot: Mutex<Slot>,
    /// Held across update and observer call so events are delivered in the
    /// order `current` records them
    delivery: Mutex<()>,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the observer; affects events delivered afterwards
    pub fn set_observer(&self, observer: StateObserver) {
        self.slot().observer = Some(observer);
    }

    pub fn clear_observer(&self) {
        self.slot().observer = None;
    }

    /// Last delivered state
    pub fn current(&self) -> ConnectionState {
        self.slot().current
    }

    /// Handle one engine event
    ///
    /// Returns the mapped state, or `None` when the event is ignored. The
    /// observer runs without the slot lock, so it may replace itself.
    pub fn handle_engine_event(&self, event: RTCPeerConnectionState) -> Option<ConnectionState> {
        let Some(state) = ConnectionState::from_engine(event) else {
            debug!(engine_state = %event, "Ignoring unmapped engine state");
            return None;
        };

        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let observer = {
            let mut slot = self.slot();
            slot.current = state;
            slot.observer.clone()
        };
        info!(state = %state, "Connection state changed");

        if let Some(observer) = observer {
            observer(state);
        }

        Some(state)
    }
}
