//! # Inbound Ports
//!
//! The signing/verification API. Consumers depend on this trait rather than
//! on `SignedRequestFactory` so tests can substitute their own signer.

use chrono::{DateTime, Utc};

use crate::domain::entities::SignedObject;
use crate::domain::errors::VerificationFailure;

/// Signed request API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignedRequestApi: Send + Sync {
    /// URL-safe base64 encoding of `payload`.
    fn encode(&self, payload: &[u8]) -> String;

    /// Keyed signature over an already-encoded payload.
    fn sign(&self, encoded_payload: &str) -> String;

    /// Encode then sign, producing the wire token.
    fn sign_payload(&self, payload: &[u8]) -> SignedObject;

    /// Verify a wire token and return its decoded payload.
    fn verify_signature(&self, token: &str) -> Result<Vec<u8>, VerificationFailure>;

    /// Verify a time-bound wire token against `now`.
    ///
    /// Returns the embedded timestamp when both the signature and the
    /// freshness window check pass.
    fn verify_timestamp(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, VerificationFailure>;

    /// `true` when the token's signature is valid.
    fn verify(&self, token: &str) -> bool {
        self.verify_signature(token).is_ok()
    }

    /// `true` when the token is a validly signed, fresh link-request timestamp.
    fn verify_link_request(&self, token: &str) -> bool {
        self.verify_timestamp(token, Utc::now()).is_ok()
    }
}
