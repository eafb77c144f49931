//! Push configuration feeding signature generation

use std::collections::HashMap;
use wtn_config::PushConfig;
use wtn_session::{SessionConfig, SignalingClient, SignalingConfig};
use wtn_usersig::{gen_user_sig_at, verify_user_sig_at, UserSigError};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_config_drives_signature_and_push_url() {
    let config = PushConfig::from_map(vars(&[
        ("WTN_SDK_APP_ID", "1400540319"),
        ("WTN_SECRET", "integration-secret"),
        ("WTN_STREAM_ID", "stream01"),
        ("WTN_USER_ID", "007"),
        ("WTN_BASE_URL", "https://signaling.example.com/"),
        ("WTN_SIG_TTL_SECS", "60"),
    ]))
    .unwrap();

    let issued_at = 1_700_000_000;
    let sig = gen_user_sig_at(
        config.sdk_app_id,
        &config.secret,
        &config.user_id,
        config.sig_ttl_secs,
        issued_at,
    )
    .unwrap();

    let document =
        verify_user_sig_at(&sig, config.sdk_app_id, &config.secret, "007", issued_at + 59).unwrap();
    assert_eq!(document.identifier, "007");
    assert_eq!(document.expires_at(), issued_at + 60);

    let err = verify_user_sig_at(&sig, config.sdk_app_id, &config.secret, "007", issued_at + 61)
        .unwrap_err();
    assert!(matches!(err, UserSigError::Expired { .. }));

    let signaling = SignalingConfig {
        base_url: config.base_url.clone(),
        timeout_ms: config.signaling_timeout_ms,
    };
    let session_config = SessionConfig::new(config.sdk_app_id, config.secret.clone())
        .with_signaling(signaling.clone());
    assert_eq!(session_config.signaling.timeout_ms, 10_000);

    let client = SignalingClient::new(&signaling, config.sdk_app_id).unwrap();
    assert_eq!(
        client.push_url(&config.stream_id),
        "https://signaling.example.com/v1/push/stream01"
    );
}
