//! # Link Outcomes
//!
//! The `Display` text of every `LinkFailure` is the reason string handed back
//! to the host and, through it, to CampMinder. Keep them stable.

use cm_02_establish_connection::ConnectionError;
use serde::Serialize;
use thiserror::Error;

/// Why a ClientLinkRequest did not produce a live connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkFailure {
    #[error("Invalid GetLinkRequest - signature was invalid!")]
    InvalidSignature,

    #[error("invalid username and password")]
    InvalidCredentials,

    #[error("partner client id not found")]
    PartnerClientNotFound,

    /// CampMinder answered `status=False`; the text is its `details`
    #[error("{0}")]
    RemoteRefused(String),

    #[error("failed to save partner client")]
    SaveFailed,

    #[error("malformed EstablishConnection response")]
    MalformedResponse,

    #[error("unable to reach CampMinder")]
    Unreachable,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("partner directory unavailable")]
    DirectoryUnavailable,
}

impl LinkFailure {
    /// Metric label for `cm_link_requests_total`.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidCredentials => "invalid_credentials",
            Self::PartnerClientNotFound => "not_found",
            Self::RemoteRefused(_) => "remote_refused",
            Self::SaveFailed => "save_failed",
            Self::MalformedResponse => "malformed",
            Self::Unreachable => "unreachable",
            Self::MissingField(_) => "missing_field",
            Self::DirectoryUnavailable => "directory_unavailable",
        }
    }
}

impl From<ConnectionError> for LinkFailure {
    fn from(error: ConnectionError) -> Self {
        match error {
            ConnectionError::MissingField(field) => Self::MissingField(field),
            ConnectionError::Transport(_) => Self::Unreachable,
            ConnectionError::MalformedResponse(_) => Self::MalformedResponse,
        }
    }
}

/// Result handed back to the host: a success flag and a reason (empty on success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub success: bool,
    pub reason: String,
}

impl LinkOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            reason: String::new(),
        }
    }

    pub fn failure(failure: &LinkFailure) -> Self {
        Self {
            success: false,
            reason: failure.to_string(),
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "failure"
        }
    }
}

impl From<Result<(), LinkFailure>> for LinkOutcome {
    fn from(result: Result<(), LinkFailure>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(failure) => Self::failure(&failure),
        }
    }
}
