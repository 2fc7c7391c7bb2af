//! # Outbound Ports
//!
//! The host application owns user accounts and persistence. The handler
//! reaches them through `PartnerDirectory`.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Identities bound together by a ClientLinkRequest, plus the CampMinder
/// connection token the host keeps for later calls.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PartnerClientLink {
    pub partner_client_id: String,
    pub client_id: String,
    pub person_id: String,
    pub token: String,
}

impl fmt::Debug for PartnerClientLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerClientLink")
            .field("partner_client_id", &self.partner_client_id)
            .field("client_id", &self.client_id)
            .field("person_id", &self.person_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Host-side failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Partner directory unavailable: {0}")]
    Unavailable(String),
}

/// Host accounts and link storage.
#[async_trait]
pub trait PartnerDirectory: Send + Sync {
    /// Whether `username` / `password` identify a host user.
    async fn valid_username_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, DirectoryError>;

    /// Partner client ID of `username`, if the host has one.
    async fn partner_client_id(&self, username: &str) -> Result<Option<String>, DirectoryError>;

    /// Persist `link`. Returns `false` when the host refused to save it.
    async fn store_partner_client(
        &self,
        link: &PartnerClientLink,
        connection_status: bool,
    ) -> Result<bool, DirectoryError>;
}
