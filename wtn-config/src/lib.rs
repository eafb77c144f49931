//! Environment configuration for the WTN push tools
//!
//! The session library itself is configured programmatically; this crate only
//! serves binaries that read their settings from `WTN_*` variables and an
//! optional `.env` file.

use serde::Deserialize;
use std::collections::HashMap;
use wtn_session::SignalingConfig;

pub use wtn_session::{DEFAULT_BASE_URL, DEFAULT_SIGNALING_TIMEOUT_MS};

/// Prefix of every recognised environment variable
pub const ENV_PREFIX: &str = "WTN";

/// Settings of a push run
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Application identifier issued by the signaling service
    pub sdk_app_id: u32,
    /// Shared secret used to sign user credentials
    pub secret: String,
    /// Stream to publish to
    pub stream_id: String,
    /// User publishing the stream
    pub user_id: String,
    pub base_url: String,
    pub signaling_timeout_ms: u64,
    /// Lifetime of the generated user signature
    pub sig_ttl_secs: u64,
    pub audio: bool,
    pub video: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl PushConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::build(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::build(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn build(source: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("signaling_timeout_ms", DEFAULT_SIGNALING_TIMEOUT_MS)?
            .set_default("sig_ttl_secs", 3600_i64)?
            .set_default("audio", true)?
            .set_default("video", true)?
            .add_source(source)
            .build()?;

        let config: PushConfig = settings.try_deserialize()?;
        if config.secret.is_empty() {
            return Err(config::ConfigError::Message(
                "WTN_SECRET must not be empty".to_string(),
            ));
        }
        if !config.audio && !config.video {
            return Err(config::ConfigError::Message(
                "at least one of WTN_AUDIO or WTN_VIDEO must be enabled".to_string(),
            ));
        }
        Ok(config)
    }

    /// Signaling settings for the session
    pub fn signaling(&self) -> SignalingConfig {
        SignalingConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.signaling_timeout_ms,
        }
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Get log format name, defaulting to "console"
    pub fn log_format(&self) -> &str {
        self.log_format.as_deref().unwrap_or("console")
    }
}
