//! WTN Push
//!
//! Publishes placeholder audio/video tracks to a stream and holds the
//! session open until Ctrl+C. The audio track carries Opus silence; the
//! video track is negotiated but sends no frames. Configuration comes from
//! `WTN_*` environment variables (a `.env` file is honored).

mod silence;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use wtn_config::PushConfig;
use wtn_logging::LogFormat;
use wtn_session::{CancellationToken, ConnectionState, SessionConfig, SessionManager};
use wtn_usersig::gen_user_sig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = PushConfig::from_env().context("Failed to load configuration")?;

    let format = config
        .log_format()
        .parse::<LogFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;
    wtn_logging::init("wtn-push", config.log_level(), format);

    info!(
        sdk_app_id = config.sdk_app_id,
        stream_id = %config.stream_id,
        user_id = %config.user_id,
        base_url = %config.base_url,
        "Configuration loaded"
    );

    let user_sig = gen_user_sig(
        config.sdk_app_id,
        &config.secret,
        &config.user_id,
        config.sig_ttl_secs,
    )
    .context("Failed to generate user signature")?;

    let session_config = SessionConfig::new(config.sdk_app_id, config.secret.clone())
        .with_audio(config.audio)
        .with_video(config.video)
        .with_signaling(config.signaling());

    let mut session = SessionManager::new(session_config)
        .await
        .context("Failed to create session")?;

    session.on_connection_state_change(|state| match state {
        ConnectionState::Connected => info!("Connection established"),
        ConnectionState::Disconnected => warn!("Connection lost"),
        ConnectionState::Failed => error!("Connection failed"),
        ConnectionState::New => {}
    });

    // Ctrl+C during the offer aborts the request instead of waiting it out
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let published = session
        .publish_with_cancel(&config.stream_id, &config.user_id, &user_sig, &cancel)
        .await;
    watcher.abort();

    if let Err(e) = published {
        error!(error = %e, "Publish failed");
        if let Err(stop_err) = session.stop().await {
            warn!(error = %stop_err, "Cleanup after failed publish");
        }
        return Err(e.into());
    }

    let media = CancellationToken::new();
    let silence = session
        .audio_track()
        .and_then(|track| track.sample_track())
        .map(|track| tokio::spawn(silence::pump(track.clone(), media.clone())));

    info!(
        stream_id = %config.stream_id,
        location = session.location().unwrap_or("-"),
        "Publishing. Press Ctrl+C to stop."
    );

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!(error = %err, "Unable to listen for shutdown signal"),
    }

    media.cancel();
    if let Some(silence) = silence {
        match silence.await {
            Ok(frames) => info!(frames = frames, "Audio source stopped"),
            Err(e) => warn!(error = %e, "Audio source task failed"),
        }
    }

    session.stop().await.context("Failed to stop session")?;
    info!(connection = %session.connection_state(), "WTN Push stopped");

    Ok(())
}
