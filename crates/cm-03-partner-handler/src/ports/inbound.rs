//! # Inbound Ports

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::outcome::LinkOutcome;

/// What the host should send back for a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    Link(LinkOutcome),
    /// XML document body
    ServerTime(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Unknown partner function: {0}")]
    UnknownFunction(String),
}

/// Inbound partner API.
#[async_trait]
pub trait PartnerHandlerApi: Send + Sync {
    /// Run the link workflow for a posted ClientLinkRequest form.
    async fn handle_client_link_request(&self, form: &HashMap<String, String>) -> LinkOutcome;

    /// ServerTimeGet response body for `now`.
    fn server_time_get(&self, now: DateTime<Utc>) -> String;

    /// Route on the posted `fn` value.
    ///
    /// # Errors
    /// * `HandlerError::UnknownFunction` - `function` is not served here
    async fn dispatch(
        &self,
        function: &str,
        form: &HashMap<String, String>,
    ) -> Result<HandlerResponse, HandlerError>;
}
