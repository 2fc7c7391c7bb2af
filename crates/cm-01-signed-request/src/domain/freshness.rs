//! # Freshness Window
//!
//! Link requests carry an ISO-8601 UTC instant after which the request is no
//! longer valid. A token is accepted when
//!
//! ```text
//! now - max_age <= timestamp <= now + max_future
//! ```
//!
//! `max_age` absorbs clock skew between CampMinder and this host. `max_future`
//! bounds how long a captured token stays usable.

use chrono::{DateTime, Duration, Utc};

use super::errors::VerificationFailure;

/// Default tolerance for timestamps already in the past (seconds).
pub const DEFAULT_MAX_AGE_SECS: i64 = 5;

/// Default horizon for timestamps in the future (seconds).
pub const DEFAULT_MAX_FUTURE_SECS: i64 = 600;

/// Largest tolerance accepted from configuration (one day).
pub const MAX_WINDOW_SECS: i64 = 86_400;

/// Acceptance window for time-bound signed objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreshnessWindow {
    max_age: Duration,
    max_future: Duration,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self::from_secs(DEFAULT_MAX_AGE_SECS, DEFAULT_MAX_FUTURE_SECS)
    }
}

impl FreshnessWindow {
    pub fn new(max_age: Duration, max_future: Duration) -> Self {
        Self {
            max_age,
            max_future,
        }
    }

    pub fn from_secs(max_age_secs: i64, max_future_secs: i64) -> Self {
        Self::new(
            Duration::seconds(max_age_secs),
            Duration::seconds(max_future_secs),
        )
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn max_future(&self) -> Duration {
        self.max_future
    }

    /// Both bounds are between zero and `MAX_WINDOW_SECS`.
    pub fn is_bounded(&self) -> bool {
        let limit = Duration::seconds(MAX_WINDOW_SECS);
        [self.max_age, self.max_future]
            .iter()
            .all(|d| *d >= Duration::zero() && *d <= limit)
    }

    /// Check `timestamp` against `now`. A window that overflows the
    /// calendar rejects every timestamp.
    pub fn check(
        &self,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationFailure> {
        let (Some(earliest), Some(latest)) = (
            now.checked_sub_signed(self.max_age),
            now.checked_add_signed(self.max_future),
        ) else {
            return Err(VerificationFailure::WindowOutOfRange { now });
        };

        if timestamp < earliest {
            return Err(VerificationFailure::Expired { timestamp, now });
        }
        if timestamp > latest {
            return Err(VerificationFailure::TooFarInFuture { timestamp, now });
        }
        Ok(())
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp payload into UTC.
pub fn parse_timestamp(payload: &[u8]) -> Result<DateTime<Utc>, VerificationFailure> {
    let text = std::str::from_utf8(payload).map_err(|_| VerificationFailure::NonUtf8Payload)?;
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VerificationFailure::InvalidTimestamp(e.to_string()))
}
