//! # Signing Errors
//!
//! `SigningError` covers factory construction. `VerificationFailure` is the
//! reason a signed object was rejected; it is a value handed back to the
//! caller, not a fault to propagate.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while building a signing factory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The shared secret is empty
    #[error("Shared secret must not be empty")]
    EmptySecret,
}

/// Why a signed object failed verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationFailure {
    /// No `.` between signature and payload
    #[error("Signed object has no delimiter")]
    MissingDelimiter,

    /// More than one `.` in the token
    #[error("Signed object has more than one delimiter")]
    ExtraDelimiter,

    /// Signature segment is empty
    #[error("Signed object has an empty signature")]
    EmptySegment,

    /// Payload segment is not URL-safe base64
    #[error("Payload is not valid URL-safe base64")]
    InvalidEncoding,

    /// Recomputed MAC does not match the supplied signature
    #[error("Signature does not match payload")]
    SignatureMismatch,

    /// Payload decoded but is not UTF-8 text
    #[error("Payload is not UTF-8")]
    NonUtf8Payload,

    /// Payload is not an ISO-8601 timestamp
    #[error("Payload is not an ISO-8601 timestamp: {0}")]
    InvalidTimestamp(String),

    /// Timestamp is older than the freshness window allows
    #[error("Timestamp {timestamp} expired (now {now})")]
    Expired {
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Timestamp is further in the future than the freshness window allows
    #[error("Timestamp {timestamp} too far in the future (now {now})")]
    TooFarInFuture {
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// The freshness window reaches outside the representable time range
    #[error("Freshness window out of range at {now}")]
    WindowOutOfRange { now: DateTime<Utc> },
}

impl VerificationFailure {
    /// Short label for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingDelimiter => "missing_delimiter",
            Self::ExtraDelimiter => "extra_delimiter",
            Self::EmptySegment => "empty_segment",
            Self::InvalidEncoding => "invalid_encoding",
            Self::SignatureMismatch => "signature_mismatch",
            Self::NonUtf8Payload => "non_utf8_payload",
            Self::InvalidTimestamp(_) => "invalid_timestamp",
            Self::Expired { .. } => "expired",
            Self::TooFarInFuture { .. } => "too_far_in_future",
            Self::WindowOutOfRange { .. } => "window_out_of_range",
        }
    }
}
