//! URL-safe base64 used for both the payload and the signature segment.
//!
//! Output never contains `+`, `/` or `=`, so a signed object can be placed in
//! a form-encoded body without further escaping. Decoding tolerates the
//! canonical trailing padding some partner implementations emit; any other
//! amount of `=` is rejected.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use super::errors::VerificationFailure;

const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode raw bytes as unpadded URL-safe base64.
pub fn encode(payload: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(payload)
}

/// Decode URL-safe base64, unpadded or canonically padded.
pub fn decode(encoded: &str) -> Result<Vec<u8>, VerificationFailure> {
    URL_SAFE
        .decode(encoded)
        .map_err(|_| VerificationFailure::InvalidEncoding)
}
