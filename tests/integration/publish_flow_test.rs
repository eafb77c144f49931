//! End-to-end publish flow over the WebRTC engine
//!
//! The signaling server is mocked; the engine is real, so offers are
//! genuine SDP. The mock answers with an unparsable body, which lets the
//! test observe everything up to remote description handling without a
//! second peer.

use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wtn_session::{SessionConfig, SessionError, SessionManager, SessionPhase, SignalingConfig};
use wtn_usersig::{gen_user_sig, verify_user_sig};

const APP_ID: u32 = 1400540319;
const SECRET: &str = "e2e-test-secret";

#[tokio::test]
async fn test_offer_carries_verifiable_signature() {
    wtn_logging::try_init("debug", wtn_logging::LogFormat::Console);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/push/e2e-stream"))
        .and(header("content-type", "application/sdp"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string("not an sdp answer")
                .insert_header("Location", "/v1/sessions/e2e"),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sessions/e2e"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let user_sig = gen_user_sig(APP_ID, SECRET, "alice", 3600).unwrap();
    let config = SessionConfig::new(APP_ID, SECRET)
        .with_audio(true)
        .with_video(true)
        .with_signaling(SignalingConfig::new(server.uri()));
    let mut session = SessionManager::new(config).await.unwrap();

    let err = session
        .publish("e2e-stream", "alice", &user_sig)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Negotiation(_)), "got {:?}", err);
    assert_eq!(session.phase(), SessionPhase::Failed);
    assert_eq!(
        session.location(),
        Some(format!("{}/v1/sessions/e2e", server.uri()).as_str())
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let offer = &requests[0];
    let query: HashMap<String, String> = offer.url.query_pairs().into_owned().collect();

    assert_eq!(query["sdkappid"], "1400540319");
    assert_eq!(query["userid"], "alice");
    let document = verify_user_sig(&query["usersig"], APP_ID, SECRET, "alice").unwrap();
    assert_eq!(document.identifier, "alice");

    let sdp = String::from_utf8(offer.body.clone()).unwrap();
    assert!(sdp.contains("m=audio"));
    assert!(sdp.contains("m=video"));
    assert!(sdp.contains("a=sendonly"));
    assert!(sdp.contains(session.stream_id()));

    session.stop().await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Stopped);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method.to_string(), "DELETE");
}

#[tokio::test]
async fn test_audio_only_offer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = SessionConfig::new(APP_ID, SECRET)
        .with_audio(true)
        .with_signaling(SignalingConfig::new(server.uri()));
    let mut session = SessionManager::new(config).await.unwrap();
    assert!(session.video_track().is_none());

    let err = session.publish("audio-only", "bob", "sig").await.unwrap_err();
    assert!(
        matches!(&err, SessionError::Signaling(status) if status == "404 Not Found"),
        "got {:?}",
        err
    );

    let requests = server.received_requests().await.unwrap();
    let sdp = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(sdp.contains("m=audio"));
    assert!(!sdp.contains("m=video"));

    // No Location was returned, so stop has nothing to delete
    let err = session.stop().await.unwrap_err();
    assert!(matches!(err, SessionError::SessionState(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = SessionConfig::new(APP_ID, SECRET)
        .with_video(true)
        .with_signaling(SignalingConfig {
            base_url: server.uri(),
            timeout_ms: 200,
        });
    let mut session = SessionManager::new(config).await.unwrap();

    let err = session.publish("slow", "carol", "sig").await.unwrap_err();
    assert!(matches!(err, SessionError::Timeout(_)), "got {:?}", err);
}
