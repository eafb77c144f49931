//! Error types for the publish session
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


use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while publishing
#[derive(Error, Debug)]
pub enum SessionError {
    /// Invalid or missing configuration, including track creation failures
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signaling server rejected a request or could not be reached
    #[error("Signaling error: {0}")]
    Signaling(String),

    /// Creating or applying a session description failed
    #[error("Negotiation error: {0}")]
    Negotiation(String),

    /// Operation not valid in the current session phase
    #[error("Invalid session state: {0}")]
    SessionState(String),

    /// A signaling request exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A signaling request was aborted by the caller
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Transport engine failure outside negotiation (attach, close)
    #[error("Engine error: {0}")]
    Engine(String),
}

impl SessionError {
    /// Prefix the error detail with the step that produced it
    pub fn context(self, step: &str) -> Self {
        match self {
            SessionError::Configuration(d) => SessionError::Configuration(format!("{}: {}", step, d)),
            SessionError::Signaling(d) => SessionError::Signaling(format!("{}: {}", step, d)),
            SessionError::Negotiation(d) => SessionError::Negotiation(format!("{}: {}", step, d)),
            SessionError::SessionState(d) => SessionError::SessionState(format!("{}: {}", step, d)),
            SessionError::Timeout(d) => SessionError::Timeout(format!("{}: {}", step, d)),
            SessionError::Cancelled(d) => SessionError::Cancelled(format!("{}: {}", step, d)),
            SessionError::Engine(d) => SessionError::Engine(format!("{}: {}", step, d)),
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::Timeout(err.to_string())
        } else {
            SessionError::Signaling(err.to_string())
        }
    }
}
