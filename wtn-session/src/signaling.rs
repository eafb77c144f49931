//! WHIP-style signaling client
//!
//! Two requests make up the protocol:
//! - `POST {base_url}/v1/push/{stream_id}?sdkappid=&userid=&usersig=` with the
//!   SDP offer as an `application/sdp` body; the response body is the SDP
//!   answer and its `Location` header is the session resource.
//! - `DELETE {location}` to end the session.
//!
//! Any status above 201 is a failure.
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


use crate::config::SignalingConfig;
use crate::error::{SessionError, SessionResult};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Highest status code treated as success
const MAX_SUCCESS_STATUS: u16 = 201;

const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Result of a successful offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferResponse {
    /// SDP answer text
    pub answer_sdp: String,
    /// Absolute session resource URL, if the server returned one
    pub location: Option<String>,
}

/// Stateless client for the signaling endpoint
#[derive(Debug, Clone)]
pub struct SignalingClient {
    client: reqwest::Client,
    base_url: String,
    sdk_app_id: u32,
    timeout: Duration,
}

impl SignalingClient {
    pub fn new(config: &SignalingConfig, sdk_app_id: u32) -> SessionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SessionError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sdk_app_id,
            timeout: config.timeout(),
        })
    }

    /// URL offers for `stream_id` are posted to
    pub fn push_url(&self, stream_id: &str) -> String {
        format!("{}/v1/push/{}", self.base_url, stream_id)
    }

    /// Post the local offer and return the answer and session location
    pub async fn offer(
        &self,
        stream_id: &str,
        user_id: &str,
        user_sig: &str,
        local_sdp: &str,
    ) -> SessionResult<OfferResponse> {
        let push_url = self.push_url(stream_id);
        info!(
            push_url = %push_url,
            sdk_app_id = self.sdk_app_id,
            user_id = user_id,
            "Posting offer"
        );

        let response = self
            .client
            .post(&push_url)
            .query(&[
                ("sdkappid", self.sdk_app_id.to_string()),
                ("userid", user_id.to_string()),
                ("usersig", user_sig.to_string()),
            ])
            .header(CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(local_sdp.to_string())
            .send()
            .await
            .map_err(|e| self.request_error("offer", e))?;

        let response = check_status(response)?;
        let location = location_of(&response);
        let answer_sdp = response
            .text()
            .await
            .map_err(|e| self.request_error("offer", e))?;

        match &location {
            Some(location) => info!(location = %location, "Offer accepted"),
            None => warn!("Offer accepted without a Location header"),
        }
        debug!(answer_len = answer_sdp.len(), "Received answer");

        Ok(OfferResponse {
            answer_sdp,
            location,
        })
    }

    /// Delete the session resource
    pub async fn terminate(&self, location: &str) -> SessionResult<()> {
        info!(location = location, "Terminating session");

        let response = self
            .client
            .delete(location)
            .send()
            .await
            .map_err(|e| self.request_error("terminate", e))?;
        check_status(response)?;

        Ok(())
    }

    fn request_error(&self, step: &str, err: reqwest::Error) -> SessionError {
        if err.is_timeout() {
            SessionError::Timeout(format!(
                "{} exceeded {} ms",
                step,
                self.timeout.as_millis()
            ))
        } else {
            SessionError::from(err).context(step)
        }
    }
}

fn check_status(response: Response) -> SessionResult<Response> {
    let status = response.status();
    if status.as_u16() > MAX_SUCCESS_STATUS {
        warn!(status = %status, url = %response.url(), "Signaling request rejected");
        return Err(SessionError::Signaling(status_line(status)));
    }
    Ok(response)
}

/// Status line without the protocol version, e.g. `404 Not Found`
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// `Location` header resolved against the request URL
fn location_of(response: &Response) -> Option<String> {
    let raw = response.headers().get(LOCATION)?.to_str().ok()?;
    if raw.is_empty() {
        return None;
    }
    match response.url().join(raw) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Run a signaling request unless `token` is cancelled first
pub async fn cancellable<T, F>(token: &CancellationToken, step: &str, request: F) -> SessionResult<T>
where
    F: Future<Output = SessionResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(SessionError::Cancelled(format!("{} aborted by caller", step))),
        result = request => result,
    }
}
