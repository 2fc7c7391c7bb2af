//! # Signed Request Factory
//!
//! Application service implementing `SignedRequestApi` on top of the domain
//! layer. Holds the shared secret and the freshness window; both are
//! immutable after construction, so one factory can be shared across tasks.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::domain::encoding;
use crate::domain::entities::{SharedSecret, SignedObject};
use crate::domain::errors::{SigningError, VerificationFailure};
use crate::domain::freshness::{self, FreshnessWindow};
use crate::domain::mac;
use crate::ports::inbound::SignedRequestApi;

/// Signs outbound payloads and verifies inbound tokens with one shared secret.
#[derive(Clone, Debug)]
pub struct SignedRequestFactory {
    secret: SharedSecret,
    window: FreshnessWindow,
}

impl SignedRequestFactory {
    /// Create a factory with the default freshness window.
    ///
    /// # Errors
    /// * `SigningError::EmptySecret` - the secret is empty
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SigningError> {
        Ok(Self::from_secret(SharedSecret::new(secret)?))
    }

    /// Create a factory from an already validated secret.
    pub fn from_secret(secret: SharedSecret) -> Self {
        Self {
            secret,
            window: FreshnessWindow::default(),
        }
    }

    /// Replace the freshness window used by `verify_timestamp`.
    pub fn with_window(mut self, window: FreshnessWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> &FreshnessWindow {
        &self.window
    }

    /// Build a time-bound token whose payload is `at` as ISO-8601 UTC.
    pub fn timestamp_token(&self, at: DateTime<Utc>) -> SignedObject {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.sign_payload(stamp.as_bytes())
    }

    fn check_signature(&self, token: &str) -> Result<Vec<u8>, VerificationFailure> {
        let signed = SignedObject::parse(token)?;

        if !mac::signature_matches(&self.secret, signed.encoded_payload(), signed.signature()) {
            return Err(VerificationFailure::SignatureMismatch);
        }

        encoding::decode(signed.encoded_payload())
    }
}

impl SignedRequestApi for SignedRequestFactory {
    fn encode(&self, payload: &[u8]) -> String {
        encoding::encode(payload)
    }

    fn sign(&self, encoded_payload: &str) -> String {
        mac::compute_signature(&self.secret, encoded_payload)
    }

    fn sign_payload(&self, payload: &[u8]) -> SignedObject {
        let encoded = self.encode(payload);
        let signature = self.sign(&encoded);
        SignedObject::new(signature, encoded)
    }

    fn verify_signature(&self, token: &str) -> Result<Vec<u8>, VerificationFailure> {
        self.check_signature(token).inspect_err(|failure| {
            debug!(kind = failure.kind(), "Signed object rejected");
        })
    }

    fn verify_timestamp(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, VerificationFailure> {
        let payload = self.verify_signature(token)?;
        let timestamp = freshness::parse_timestamp(&payload)?;

        self.window.check(timestamp, now).inspect_err(|failure| {
            debug!(
                kind = failure.kind(),
                timestamp = %timestamp,
                now = %now,
                "Time-bound signed object outside freshness window"
            );
        })?;

        Ok(timestamp)
    }
}
