//! TLS signature v2 generation and verification
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


use crate::error::{UserSigError, UserSigResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::io::{Read, Write};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Document format version
const SIG_VERSION: &str = "2.0";

/// Signed document carried (compressed) inside a user signature
///
/// Fields are declared in key order so the JSON matches what other
/// signers produce byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigDocument {
    /// Lifetime in seconds, counted from `time`
    #[serde(rename = "TLS.expire")]
    pub expire: u64,
    #[serde(rename = "TLS.identifier")]
    pub identifier: String,
    #[serde(rename = "TLS.sdkappid")]
    pub sdk_app_id: u32,
    /// Base64 HMAC-SHA256 over the content string
    #[serde(rename = "TLS.sig")]
    pub sig: String,
    /// Issue time, unix seconds
    #[serde(rename = "TLS.time")]
    pub time: i64,
    #[serde(rename = "TLS.ver")]
    pub version: String,
}

impl SigDocument {
    /// Unix time after which the signature is rejected
    pub fn expires_at(&self) -> i64 {
        self.time
            .saturating_add(i64::try_from(self.expire).unwrap_or(i64::MAX))
    }
}

/// Generate a user signature valid for `ttl_secs` from now
pub fn gen_user_sig(
    sdk_app_id: u32,
    secret: &str,
    user_id: &str,
    ttl_secs: u64,
) -> UserSigResult<String> {
    gen_user_sig_at(sdk_app_id, secret, user_id, ttl_secs, chrono::Utc::now().timestamp())
}

/// Generate a user signature issued at `now` (unix seconds)
pub fn gen_user_sig_at(
    sdk_app_id: u32,
    secret: &str,
    user_id: &str,
    ttl_secs: u64,
    now: i64,
) -> UserSigResult<String> {
    if secret.is_empty() {
        return Err(UserSigError::InvalidInput("secret must not be empty".to_string()));
    }
    if user_id.is_empty() {
        return Err(UserSigError::InvalidInput("user id must not be empty".to_string()));
    }

    let sig = hmac_sha256(secret, user_id, sdk_app_id, now, ttl_secs)?;
    let document = SigDocument {
        expire: ttl_secs,
        identifier: user_id.to_string(),
        sdk_app_id,
        sig,
        time: now,
        version: SIG_VERSION.to_string(),
    };

    let json = serde_json::to_vec(&document)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    debug!(
        sdk_app_id = sdk_app_id,
        user_id = user_id,
        ttl_secs = ttl_secs,
        "Generated user signature"
    );

    Ok(escape(&STANDARD.encode(compressed)))
}

/// Verify a user signature against the current time
pub fn verify_user_sig(
    user_sig: &str,
    sdk_app_id: u32,
    secret: &str,
    user_id: &str,
) -> UserSigResult<SigDocument> {
    verify_user_sig_at(user_sig, sdk_app_id, secret, user_id, chrono::Utc::now().timestamp())
}

/// Verify a user signature as of `now` (unix seconds) and return its document
pub fn verify_user_sig_at(
    user_sig: &str,
    sdk_app_id: u32,
    secret: &str,
    user_id: &str,
    now: i64,
) -> UserSigResult<SigDocument> {
    let compressed = STANDARD
        .decode(unescape(user_sig))
        .map_err(|e| UserSigError::Decoding(format!("base64: {}", e)))?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| UserSigError::Decoding(format!("zlib: {}", e)))?;

    let document: SigDocument = serde_json::from_slice(&json)?;

    if document.version != SIG_VERSION {
        return Err(UserSigError::Decoding(format!(
            "unsupported version {}",
            document.version
        )));
    }
    if document.identifier != user_id || document.sdk_app_id != sdk_app_id {
        return Err(UserSigError::Verification(user_id.to_string()));
    }

    let expected = STANDARD
        .decode(&document.sig)
        .map_err(|e| UserSigError::Decoding(format!("base64 signature: {}", e)))?;
    let mut mac = new_mac(secret)?;
    mac.update(content(user_id, sdk_app_id, document.time, document.expire).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| UserSigError::Verification(user_id.to_string()))?;

    if document.expires_at() < now {
        return Err(UserSigError::Expired {
            expired_at: document.expires_at(),
        });
    }

    Ok(document)
}

fn content(user_id: &str, sdk_app_id: u32, time: i64, expire: u64) -> String {
    format!(
        "TLS.identifier:{}\nTLS.sdkappid:{}\nTLS.time:{}\nTLS.expire:{}\n",
        user_id, sdk_app_id, time, expire
    )
}

fn new_mac(secret: &str) -> UserSigResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| UserSigError::Encoding(format!("HMAC key: {}", e)))
}

fn hmac_sha256(
    secret: &str,
    user_id: &str,
    sdk_app_id: u32,
    time: i64,
    expire: u64,
) -> UserSigResult<String> {
    let mut mac = new_mac(secret)?;
    mac.update(content(user_id, sdk_app_id, time, expire).as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Map base64 to the URL-safe alphabet the signaling server expects
fn escape(encoded: &str) -> String {
    encoded
        .chars()
        .map(|c| match c {
            '+' => '*',
            '/' => '-',
            '=' => '_',
            other => other,
        })
        .collect()
}

fn unescape(user_sig: &str) -> String {
    user_sig
        .chars()
        .map(|c| match c {
            '*' => '+',
            '-' => '/',
            '_' => '=',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_ttl_never_expires() {
        let sig = gen_user_sig_at(1400540319, "secret", "user01", u64::MAX, 1_700_000_000).unwrap();
        let document =
            verify_user_sig_at(&sig, 1400540319, "secret", "user01", 4_000_000_000).unwrap();
        assert_eq!(document.expire, u64::MAX);
        assert_eq!(document.expires_at(), i64::MAX);
    }

    #[test]
    fn test_escape_roundtrip() {
        let raw = "ab+/cd==";
        assert_eq!(escape(raw), "ab*-cd__");
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn test_content_layout() {
        assert_eq!(
            content("user01", 1400000000, 1700000000, 3600),
            "TLS.identifier:user01\nTLS.sdkappid:1400000000\nTLS.time:1700000000\nTLS.expire:3600\n"
        );
    }

    #[test]
    fn test_document_key_order() {
        let document = SigDocument {
            expire: 60,
            identifier: "u".to_string(),
            sdk_app_id: 1,
            sig: "s".to_string(),
            time: 2,
            version: SIG_VERSION.to_string(),
        };
        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(
            json,
            r#"{"TLS.expire":60,"TLS.identifier":"u","TLS.sdkappid":1,"TLS.sig":"s","TLS.time":2,"TLS.ver":"2.0"}"#
        );
    }

    #[test]
    fn test_rejects_empty_inputs() {
        assert!(matches!(
            gen_user_sig(1, "", "user01", 60),
            Err(UserSigError::InvalidInput(_))
        ));
        assert!(matches!(
            gen_user_sig(1, "secret", "", 60),
            Err(UserSigError::InvalidInput(_))
        ));
    }
}
