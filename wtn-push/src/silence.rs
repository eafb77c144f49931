//! Opus silence source for the placeholder audio track

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};
use webrtc::media::Sample;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use wtn_session::CancellationToken;

/// One 20 ms Opus frame of silence (TOC 0xf8, CELT fullband)
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

const FRAME_DURATION: Duration = Duration::from_millis(20);

/// Write silence frames into `track` until `cancel` fires
///
/// Returns the number of frames written. Write failures are logged and the
/// pump keeps going; frames written before the transport is up are dropped
/// by the track.
pub async fn pump(track: Arc<TrackLocalStaticSample>, cancel: CancellationToken) -> u64 {
    let mut ticker = interval(FRAME_DURATION);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let sample = Sample {
                    data: OPUS_SILENCE.to_vec().into(),
                    duration: FRAME_DURATION,
                    timestamp: SystemTime::now(),
                    ..Default::default()
                };
                match track.write_sample(&sample).await {
                    Ok(()) => frames += 1,
                    Err(e) => warn!(error = %e, "Failed to write silence frame"),
                }
            }
        }
    }

    debug!(frames = frames, "Silence source stopped");
    frames
}
