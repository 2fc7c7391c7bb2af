//! # Connection Service
//!
//! `ConnectionService` owns the business partner ID, the signer and the
//! transport. Each outbound call is an `EstablishConnection` that walks
//! `Built -> Signed -> Sent -> {Succeeded | Failed | Malformed}`.

use async_trait::async_trait;
use cm_01_signed_request::{SignedObject, SignedRequestApi, SignedRequestFactory};
use cm_telemetry::{metric_inc, CONNECT_ATTEMPTS, CONNECT_OUTCOMES};
use tracing::{debug, info, warn};

use crate::adapters::http::HttpPartnerTransport;
use crate::domain::config::PartnerConfig;
use crate::domain::connection_request::ConnectionRequest;
use crate::domain::errors::ConnectionError;
use crate::domain::response::{parse_response, ConnectionResult};
use crate::ports::inbound::ConnectionApi;
use crate::ports::outbound::{PartnerForm, PartnerTransport, TransportError};

/// Sends signed EstablishConnection requests through a `PartnerTransport`.
#[derive(Clone, Debug)]
pub struct ConnectionService<T: PartnerTransport> {
    business_partner_id: String,
    signer: SignedRequestFactory,
    transport: T,
}

impl ConnectionService<HttpPartnerTransport> {
    /// Service over HTTPS using the configured proxy and timeouts.
    pub fn from_config(config: &PartnerConfig) -> Result<Self, TransportError> {
        let transport = HttpPartnerTransport::new(config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: PartnerTransport> ConnectionService<T> {
    pub fn new(config: &PartnerConfig, transport: T) -> Self {
        Self {
            business_partner_id: config.business_partner_id.clone(),
            signer: config.signing_factory(),
            transport,
        }
    }

    pub fn signer(&self) -> &SignedRequestFactory {
        &self.signer
    }

    pub fn business_partner_id(&self) -> &str {
        &self.business_partner_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sign the XML payload of `request`.
    pub fn signed_object(&self, request: &ConnectionRequest) -> SignedObject {
        self.signer.sign_payload(request.payload().as_bytes())
    }

    /// Start a single connection attempt for `request`.
    pub fn begin(&self, request: ConnectionRequest) -> EstablishConnection<'_, T> {
        EstablishConnection::new(self, request)
    }

    /// One round trip: POST the form, parse the body, record the outcome.
    pub async fn send(&self, form: &PartnerForm) -> Result<ConnectionResult, ConnectionError> {
        metric_inc!(CONNECT_ATTEMPTS);
        debug!(
            business_partner_id = %form.business_partner_id,
            "Sending EstablishConnection"
        );

        let body = match self.transport.post_form(form).await {
            Ok(body) => body,
            Err(e) => {
                metric_inc!(CONNECT_OUTCOMES, &["transport"]);
                warn!(error = %e, "EstablishConnection transport failure");
                return Err(e.into());
            }
        };

        let result = parse_response(&body);
        metric_inc!(CONNECT_OUTCOMES, &[result.outcome_label()]);

        match &result {
            ConnectionResult::Success => info!("CampMinder connection established"),
            ConnectionResult::Failure { reason } => {
                info!(reason = %reason, "CampMinder refused connection")
            }
            ConnectionResult::Malformed { detail } => {
                warn!(detail = %detail, "Unrecognized EstablishConnection response")
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl<T: PartnerTransport> ConnectionApi for ConnectionService<T> {
    async fn establish(
        &self,
        request: &ConnectionRequest,
    ) -> Result<ConnectionResult, ConnectionError> {
        let signed = self.signed_object(request);
        let form = PartnerForm::establish_connection(&self.business_partner_id, &signed);
        self.send(&form).await
    }
}

// =============================================================================
// Per-call State Machine
// =============================================================================

/// Where an `EstablishConnection` is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Built,
    Signed,
    Sent,
    Succeeded,
    Failed { reason: String },
    Malformed { detail: String },
}

/// A single connection attempt bound to one request.
///
/// `connect()` may be awaited again after a transport fault; every call is a
/// fresh round trip reusing the same signed object.
pub struct EstablishConnection<'a, T: PartnerTransport> {
    service: &'a ConnectionService<T>,
    request: ConnectionRequest,
    signed: Option<SignedObject>,
    state: ConnectionState,
}

impl<'a, T: PartnerTransport> EstablishConnection<'a, T> {
    fn new(service: &'a ConnectionService<T>, request: ConnectionRequest) -> Self {
        Self {
            service,
            request,
            signed: None,
            state: ConnectionState::Built,
        }
    }

    pub fn request(&self) -> &ConnectionRequest {
        &self.request
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// XML document that gets signed.
    pub fn payload(&self) -> String {
        self.request.payload()
    }

    /// Signed payload, computed on first use.
    pub fn signed_object(&mut self) -> &SignedObject {
        if self.state == ConnectionState::Built {
            self.state = ConnectionState::Signed;
        }
        let service = self.service;
        let request = &self.request;
        self.signed
            .get_or_insert_with(|| service.signed_object(request))
    }

    /// Send the request and report whether CampMinder accepted it.
    ///
    /// # Errors
    /// * `ConnectionError::Transport` - no response was obtained
    /// * `ConnectionError::MalformedResponse` - the body was not a recognizable reply
    pub async fn connect(&mut self) -> Result<bool, ConnectionError> {
        let service = self.service;
        let form =
            PartnerForm::establish_connection(service.business_partner_id(), self.signed_object());
        self.state = ConnectionState::Sent;

        match service.send(&form).await {
            Ok(ConnectionResult::Success) => {
                self.state = ConnectionState::Succeeded;
                Ok(true)
            }
            Ok(ConnectionResult::Failure { reason }) => {
                self.state = ConnectionState::Failed { reason };
                Ok(false)
            }
            Ok(ConnectionResult::Malformed { detail }) => {
                self.state = ConnectionState::Malformed {
                    detail: detail.clone(),
                };
                Err(ConnectionError::MalformedResponse(detail))
            }
            Err(e) => {
                // Nothing came back; the signed request can be retried
                self.state = ConnectionState::Signed;
                Err(e)
            }
        }
    }

    /// Remote reason for a `false` result from `connect()`.
    pub fn connection_failure_reason(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
