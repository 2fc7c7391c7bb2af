//! # Outbound Ports
//!
//! The transport that carries a form-encoded request to CampMinder and
//! returns the raw response body.

use cm_01_signed_request::SignedObject;
use thiserror::Error;

/// `fn` value for the establish-connection call.
pub const ESTABLISH_CONNECTION_FN: &str = "EstablishConnection";

pub const FORM_FN: &str = "fn";
pub const FORM_BUSINESS_PARTNER_ID: &str = "businessPartnerID";
pub const FORM_SIGNED_OBJECT: &str = "signedObject";

/// Form body sent to the partner endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerForm {
    pub function: String,
    pub business_partner_id: String,
    pub signed_object: String,
}

impl PartnerForm {
    pub fn establish_connection(business_partner_id: &str, signed_object: &SignedObject) -> Self {
        Self {
            function: ESTABLISH_CONNECTION_FN.to_string(),
            business_partner_id: business_partner_id.to_string(),
            signed_object: signed_object.to_string(),
        }
    }

    /// Key/value pairs in the order they are encoded.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            (FORM_FN, &self.function),
            (FORM_BUSINESS_PARTNER_ID, &self.business_partner_id),
            (FORM_SIGNED_OBJECT, &self.signed_object),
        ]
    }
}

/// Failures below the protocol level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// TCP/TLS/proxy connection failed
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Connect or request timeout expired
    #[error("Request timed out")]
    Timeout,

    /// The partner answered with a non-2xx status
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// Any other HTTP-level failure
    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Carries a form to the partner endpoint.
#[async_trait::async_trait]
pub trait PartnerTransport: Send + Sync {
    /// POST `form` and return the response body.
    async fn post_form(&self, form: &PartnerForm) -> Result<String, TransportError>;
}
