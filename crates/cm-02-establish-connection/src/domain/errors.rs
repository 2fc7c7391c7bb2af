//! # Connection Errors

use thiserror::Error;

use crate::ports::outbound::TransportError;

/// Errors from building or sending an `EstablishConnection` request.
///
/// A remote `status=False` is not an error; it is `Ok(false)` from `connect()`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// A required identifying field was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The request never produced a response body
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The response body was not a recognizable EstablishConnection reply
    #[error("Malformed EstablishConnection response: {0}")]
    MalformedResponse(String),
}
