//! Subcommand implementations. Results go to stdout as JSON or raw XML.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use cm_01_signed_request::{SignedRequestApi, SignedRequestFactory};
use cm_02_establish_connection::{
    ConnectionError, ConnectionRequest, ConnectionService, PartnerConfig, XmlDeclaration,
};
use cm_03_partner_handler::render_server_time;
use serde::Serialize;
use tracing::info;

pub struct RequestFields {
    pub client_id: String,
    pub person_id: String,
    pub token: String,
    pub partner_client_id: String,
}

impl RequestFields {
    fn build(&self) -> Result<ConnectionRequest, ConnectionError> {
        ConnectionRequest::new(
            self.client_id.as_str(),
            self.person_id.as_str(),
            self.token.as_str(),
            self.partner_client_id.as_str(),
        )
    }
}

#[derive(Serialize)]
struct Verified {
    valid: bool,
    payload: Option<String>,
    failure: Option<String>,
}

#[derive(Serialize)]
struct Connected {
    connected: bool,
    reason: Option<String>,
}

fn factory(secret: &str) -> Result<SignedRequestFactory> {
    SignedRequestFactory::new(secret).context("invalid shared secret")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn sign(secret: &str, payload: &str) -> Result<()> {
    let signed = factory(secret)?.sign_payload(payload.as_bytes());
    println!("{}", signed);
    Ok(())
}

pub fn verify(secret: &str, token: &str, timestamp: bool) -> Result<()> {
    let window =
        PartnerConfig::link_window_from_env().context("loading CAMPMINDER_LINK_MAX_* settings")?;
    let factory = factory(secret)?.with_window(window);

    let result = if timestamp {
        factory
            .verify_timestamp(token, Utc::now())
            .map(|ts| ts.to_rfc3339().into_bytes())
    } else {
        factory.verify_signature(token)
    };

    let report = match result {
        Ok(payload) => Verified {
            valid: true,
            payload: Some(String::from_utf8_lossy(&payload).into_owned()),
            failure: None,
        },
        Err(failure) => Verified {
            valid: false,
            payload: None,
            failure: Some(failure.to_string()),
        },
    };
    print_json(&report)
}

pub fn timestamp_token(secret: &str, offset_secs: i64) -> Result<()> {
    let offset = Duration::try_seconds(offset_secs).context("offset out of range")?;
    let token = factory(secret)?.timestamp_token(Utc::now() + offset);
    println!("{}", token);
    Ok(())
}

pub fn payload(fields: &RequestFields, declaration: bool) -> Result<()> {
    let request = fields.build()?;
    let declaration = if declaration {
        XmlDeclaration::Include
    } else {
        XmlDeclaration::Omit
    };
    print!("{}", request.to_xml(declaration));
    Ok(())
}

pub async fn connect(fields: &RequestFields) -> Result<()> {
    let request = fields.build()?;
    let config = PartnerConfig::from_env().context("loading CAMPMINDER_* settings")?;
    config.validate_for_production()?;

    info!(
        endpoint = %config.web_service_url,
        business_partner_id = %config.business_partner_id,
        "Connecting to CampMinder"
    );

    let service = ConnectionService::from_config(&config)?;
    let mut call = service.begin(request);

    match call.connect().await {
        Ok(connected) => print_json(&Connected {
            connected,
            reason: call.connection_failure_reason().map(str::to_string),
        }),
        Err(ConnectionError::MalformedResponse(detail)) => {
            bail!("CampMinder sent an unrecognized response: {}", detail)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn server_time() {
    print!("{}", render_server_time(Utc::now()));
}
