//! # Partner Handler Service
//!
//! Runs the ClientLinkRequest workflow against the host directory and the
//! CampMinder connection API, and answers ServerTimeGet.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cm_01_signed_request::{SignedRequestApi, SignedRequestFactory};
use cm_02_establish_connection::{ConnectionApi, ConnectionResult};
use cm_telemetry::{metric_inc, LINK_REQUESTS, SIGNATURE_FAILURES};
use tracing::{debug, info, warn};

use crate::domain::link_request::ClientLinkRequest;
use crate::domain::outcome::{LinkFailure, LinkOutcome};
use crate::domain::server_time::{render_server_time, SERVER_TIME_GET_FN};
use crate::ports::inbound::{HandlerError, HandlerResponse, PartnerHandlerApi};
use crate::ports::outbound::{PartnerClientLink, PartnerDirectory};

/// `fn` value of the link request.
pub const CLIENT_LINK_REQUEST_FN: &str = "ClientLinkRequest";

/// Inbound handler over a connection API and a host directory.
pub struct PartnerHandlerService<C: ConnectionApi, D: PartnerDirectory> {
    verifier: SignedRequestFactory,
    connection: C,
    directory: D,
}

impl<C: ConnectionApi, D: PartnerDirectory> PartnerHandlerService<C, D> {
    /// `verifier` must carry the shared secret and link freshness window.
    pub fn new(verifier: SignedRequestFactory, connection: C, directory: D) -> Self {
        Self {
            verifier,
            connection,
            directory,
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Link workflow evaluated at `now`.
    pub async fn link_at(
        &self,
        form: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<(), LinkFailure> {
        let request = ClientLinkRequest::from_form(form)?;
        self.link(&request, now).await
    }

    async fn link(&self, request: &ClientLinkRequest, now: DateTime<Utc>) -> Result<(), LinkFailure> {
        if let Err(failure) = self.verifier.verify_timestamp(&request.signed_object, now) {
            metric_inc!(SIGNATURE_FAILURES, &[failure.kind()]);
            return Err(LinkFailure::InvalidSignature);
        }

        let valid = self
            .directory
            .valid_username_password(&request.username, &request.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Credential check failed");
                LinkFailure::DirectoryUnavailable
            })?;
        if !valid {
            return Err(LinkFailure::InvalidCredentials);
        }

        let partner_client_id = self
            .directory
            .partner_client_id(&request.username)
            .await
            .map_err(|e| {
                warn!(error = %e, "Partner client lookup failed");
                LinkFailure::DirectoryUnavailable
            })?
            .ok_or(LinkFailure::PartnerClientNotFound)?;

        let connection_request = request.connection_request(&partner_client_id)?;
        let refused = match self.connection.establish(&connection_request).await? {
            ConnectionResult::Success => None,
            ConnectionResult::Failure { reason } => Some(reason),
            ConnectionResult::Malformed { detail } => {
                debug!(detail = %detail, "Malformed EstablishConnection reply");
                return Err(LinkFailure::MalformedResponse);
            }
        };

        let link = PartnerClientLink {
            partner_client_id,
            client_id: request.client_id.clone(),
            person_id: request.person_id.clone(),
            token: request.token.clone(),
        };
        let connection_status = refused.is_none();

        match self
            .directory
            .store_partner_client(&link, connection_status)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(LinkFailure::SaveFailed),
            Err(e) => {
                warn!(error = %e, "Storing partner client failed");
                return Err(LinkFailure::SaveFailed);
            }
        }

        match refused {
            None => Ok(()),
            Some(reason) => Err(LinkFailure::RemoteRefused(reason)),
        }
    }

    fn record(&self, result: &Result<(), LinkFailure>) {
        match result {
            Ok(()) => {
                metric_inc!(LINK_REQUESTS, &["success"]);
                info!("ClientLinkRequest linked");
            }
            Err(failure) => {
                metric_inc!(LINK_REQUESTS, &[failure.outcome_label()]);
                info!(reason = %failure, "ClientLinkRequest rejected");
            }
        }
    }
}

#[async_trait]
impl<C: ConnectionApi, D: PartnerDirectory> PartnerHandlerApi for PartnerHandlerService<C, D> {
    async fn handle_client_link_request(&self, form: &HashMap<String, String>) -> LinkOutcome {
        let result = self.link_at(form, Utc::now()).await;
        self.record(&result);
        LinkOutcome::from(result)
    }

    fn server_time_get(&self, now: DateTime<Utc>) -> String {
        render_server_time(now)
    }

    async fn dispatch(
        &self,
        function: &str,
        form: &HashMap<String, String>,
    ) -> Result<HandlerResponse, HandlerError> {
        match function {
            CLIENT_LINK_REQUEST_FN => Ok(HandlerResponse::Link(
                self.handle_client_link_request(form).await,
            )),
            SERVER_TIME_GET_FN => Ok(HandlerResponse::ServerTime(
                self.server_time_get(Utc::now()),
            )),
            other => {
                debug!(function = %other, "Unknown partner function");
                Err(HandlerError::UnknownFunction(other.to_string()))
            }
        }
    }
}
