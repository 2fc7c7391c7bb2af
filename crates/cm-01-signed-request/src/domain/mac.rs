//! HMAC-SHA256 over the encoded payload string.
//!
//! The MAC input is the base64url text exactly as it appears on the wire, not
//! the decoded bytes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::encoding;
use super::entities::SharedSecret;

type HmacSha256 = Hmac<Sha256>;

fn keyed(secret: &SharedSecret) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.expose()).expect("HMAC can take key of any size")
}

/// Compute the base64url signature for `encoded_payload`.
pub fn compute_signature(secret: &SharedSecret, encoded_payload: &str) -> String {
    let mut mac = keyed(secret);
    mac.update(encoded_payload.as_bytes());
    encoding::encode(mac.finalize().into_bytes())
}

/// Check `signature` against `encoded_payload` in constant time.
pub fn signature_matches(secret: &SharedSecret, encoded_payload: &str, signature: &str) -> bool {
    let Ok(provided) = encoding::decode(signature) else {
        return false;
    };

    let mut mac = keyed(secret);
    mac.update(encoded_payload.as_bytes());
    mac.verify_slice(&provided).is_ok()
}
