//! # Signed Request Factory (CM-01)
//!
//! Turns opaque payloads into transport-safe signed tokens for the CampMinder
//! partner protocol, and verifies such tokens on the way back.
//!
//! ## Wire Format
//!
//! ```text
//! signedObject = base64url(HMAC-SHA256(secret, encodedPayload)) "." encodedPayload
//! encodedPayload = base64url(payload)          ; no padding
//! ```
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): encoding, MAC computation, freshness window
//! - **Ports Layer** (`ports/`): the `SignedRequestApi` trait consumed by other crates
//! - **Service Layer** (`service.rs`): `SignedRequestFactory`, holding the shared secret
//!
//! ## Security Notes
//!
//! - Verification never panics and never returns an error type that could be
//!   propagated past the caller by accident: callers get a `bool` or a
//!   `VerificationFailure` value.
//! - MAC comparison is constant time (`Mac::verify_slice`).
//! - The shared secret is zeroized on drop and redacted from `Debug` output.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::encoding::{decode, encode};
pub use domain::entities::{SharedSecret, SignedObject, DELIMITER};
pub use domain::errors::{SigningError, VerificationFailure};
pub use domain::freshness::{FreshnessWindow, MAX_WINDOW_SECS};
pub use ports::inbound::SignedRequestApi;
pub use service::SignedRequestFactory;
