//! # ClientLinkRequest
//!
//! Form posted by CampMinder when a user links their camp account to this
//! partner.

use std::collections::HashMap;
use std::fmt;

use cm_02_establish_connection::{ConnectionError, ConnectionRequest};

use super::outcome::LinkFailure;

pub const FIELD_USERNAME: &str = "username";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_SIGNED_OBJECT: &str = "signedObject";
pub const FIELD_TOKEN: &str = "token";
pub const FIELD_CLIENT_ID: &str = "clientID";
pub const FIELD_PERSON_ID: &str = "personID";

/// Parsed ClientLinkRequest form.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientLinkRequest {
    pub username: String,
    pub password: String,
    /// Time-bound signed object proving the request came from CampMinder
    pub signed_object: String,
    pub token: String,
    pub client_id: String,
    pub person_id: String,
}

impl ClientLinkRequest {
    /// Extract the six fields. Blank values count as missing.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, LinkFailure> {
        let field = |name: &'static str| {
            form.get(name)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or(LinkFailure::MissingField(name))
        };

        Ok(Self {
            username: field(FIELD_USERNAME)?,
            password: field(FIELD_PASSWORD)?,
            signed_object: field(FIELD_SIGNED_OBJECT)?,
            token: field(FIELD_TOKEN)?,
            client_id: field(FIELD_CLIENT_ID)?,
            person_id: field(FIELD_PERSON_ID)?,
        })
    }

    /// EstablishConnection request for this link.
    pub fn connection_request(
        &self,
        partner_client_id: &str,
    ) -> Result<ConnectionRequest, ConnectionError> {
        ConnectionRequest::new(
            self.client_id.as_str(),
            self.person_id.as_str(),
            self.token.as_str(),
            partner_client_id,
        )
    }
}

impl fmt::Debug for ClientLinkRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientLinkRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("signed_object", &"<redacted>")
            .field("token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("person_id", &self.person_id)
            .finish()
    }
}
