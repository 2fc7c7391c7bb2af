//! # Domain Entities
//!
//! The shared secret and the signed object that travels on the wire.

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::{SigningError, VerificationFailure};

/// Separator between signature and payload. Not part of the base64url alphabet.
pub const DELIMITER: char = '.';

// =============================================================================
// Shared Secret
// =============================================================================

/// Pre-shared key issued by CampMinder to the business partner.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap a secret. Empty secrets are rejected.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SigningError> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        Ok(Self(bytes.to_vec()))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

// =============================================================================
// Signed Object
// =============================================================================

/// A signature and the encoded payload it covers.
///
/// Rendered with `Display` as `"<signature>.<encodedPayload>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedObject {
    signature: String,
    encoded_payload: String,
}

impl SignedObject {
    pub fn new(signature: impl Into<String>, encoded_payload: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            encoded_payload: encoded_payload.into(),
        }
    }

    /// Split a wire token into its two segments.
    ///
    /// Exactly one delimiter is allowed and the signature may not be empty.
    /// An empty payload segment is the encoding of an empty payload.
    /// Nothing is decoded or verified here.
    pub fn parse(token: &str) -> Result<Self, VerificationFailure> {
        let (signature, encoded_payload) = token
            .split_once(DELIMITER)
            .ok_or(VerificationFailure::MissingDelimiter)?;

        if encoded_payload.contains(DELIMITER) {
            return Err(VerificationFailure::ExtraDelimiter);
        }
        if signature.is_empty() {
            return Err(VerificationFailure::EmptySegment);
        }

        Ok(Self::new(signature, encoded_payload))
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }
}

impl fmt::Display for SignedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.signature, DELIMITER, self.encoded_payload)
    }
}

impl FromStr for SignedObject {
    type Err = VerificationFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
