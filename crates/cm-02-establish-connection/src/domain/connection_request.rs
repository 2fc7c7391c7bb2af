//! # Connection Request
//!
//! The four identifiers CampMinder needs to bind a partner client to a
//! CampMinder client, and their fixed XML rendering.

use std::collections::HashMap;

use quick_xml::escape::partial_escape;

use super::errors::ConnectionError;

pub const FIELD_CLIENT_ID: &str = "clientID";
pub const FIELD_PERSON_ID: &str = "personID";
pub const FIELD_TOKEN: &str = "token";
pub const FIELD_PARTNER_CLIENT_ID: &str = "partnerClientID";

/// Schema version carried on the root element.
pub const SCHEMA_VERSION: &str = "1";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_ELEMENT: &str = "connectionRequest";

/// Whether a rendered document starts with an XML declaration.
///
/// The signed payload omits it; standalone documents include it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlDeclaration {
    Include,
    Omit,
}

/// Immutable, fully populated connection request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionRequest {
    client_id: String,
    person_id: String,
    token: String,
    partner_client_id: String,
}

impl ConnectionRequest {
    /// Build a request. Blank values are treated as missing.
    ///
    /// # Errors
    /// * `ConnectionError::MissingField` naming the first absent field
    pub fn new(
        client_id: impl Into<String>,
        person_id: impl Into<String>,
        token: impl Into<String>,
        partner_client_id: impl Into<String>,
    ) -> Result<Self, ConnectionError> {
        Ok(Self {
            client_id: required(FIELD_CLIENT_ID, client_id.into())?,
            person_id: required(FIELD_PERSON_ID, person_id.into())?,
            token: required(FIELD_TOKEN, token.into())?,
            partner_client_id: required(FIELD_PARTNER_CLIENT_ID, partner_client_id.into())?,
        })
    }

    /// Build a request from wire-named fields (`clientID`, `personID`, ...).
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, ConnectionError> {
        let take = |name: &'static str| {
            fields
                .get(name)
                .cloned()
                .ok_or(ConnectionError::MissingField(name))
        };

        Self::new(
            take(FIELD_CLIENT_ID)?,
            take(FIELD_PERSON_ID)?,
            take(FIELD_TOKEN)?,
            take(FIELD_PARTNER_CLIENT_ID)?,
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn person_id(&self) -> &str {
        &self.person_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn partner_client_id(&self) -> &str {
        &self.partner_client_id
    }

    /// Fields in wire order. The order is part of the signed payload.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            (FIELD_CLIENT_ID, &self.client_id),
            (FIELD_PERSON_ID, &self.person_id),
            (FIELD_TOKEN, &self.token),
            (FIELD_PARTNER_CLIENT_ID, &self.partner_client_id),
        ]
    }

    /// Render the request document with two-space indentation.
    pub fn to_xml(&self, declaration: XmlDeclaration) -> String {
        let mut xml = String::with_capacity(256);

        if declaration == XmlDeclaration::Include {
            xml.push_str(XML_DECLARATION);
            xml.push('\n');
        }

        xml.push_str(&format!(
            "<{} version=\"{}\">\n",
            ROOT_ELEMENT, SCHEMA_VERSION
        ));
        for (name, value) in self.fields() {
            xml.push_str(&format!("  <{name}>{}</{name}>\n", partial_escape(value)));
        }
        xml.push_str(&format!("</{}>\n", ROOT_ELEMENT));

        xml
    }

    /// The document that gets signed: no XML declaration.
    pub fn payload(&self) -> String {
        self.to_xml(XmlDeclaration::Omit)
    }
}

fn required(name: &'static str, value: String) -> Result<String, ConnectionError> {
    if value.trim().is_empty() {
        return Err(ConnectionError::MissingField(name));
    }
    Ok(value)
}
