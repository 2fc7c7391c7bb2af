//! # Integration Test Flows
//!
//! ClientLinkRequest end to end: CampMinder issues a time-bound token, the
//! handler verifies it, checks the host directory, runs EstablishConnection
//! and stores the link.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, Utc};
    use cm_01_signed_request::{SignedRequestApi, SignedRequestFactory};
    use cm_02_establish_connection::{ConnectionRequest, ConnectionService, PartnerConfig};
    use cm_03_partner_handler::{
        HandlerResponse, LinkOutcome, PartnerClientLink, PartnerHandlerApi, PartnerHandlerService,
    };

    use crate::integration::support::{
        reply, InMemoryDirectory, RecordingTransport, StubServer, BUSINESS_PARTNER_ID, SECRET,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn config(url: &str) -> PartnerConfig {
        PartnerConfig::new(SECRET, BUSINESS_PARTNER_ID, url).unwrap()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::default()
            .with_account("jdoe", "pa55word", Some("IEX-C-123"))
            .with_account("orphan", "pa55word", None)
    }

    /// Form as CampMinder posts it, with a token expiring in one minute.
    fn link_form(username: &str, password: &str) -> HashMap<String, String> {
        let token = SignedRequestFactory::new(SECRET)
            .unwrap()
            .timestamp_token(Utc::now() + Duration::seconds(60));

        [
            ("username", username.to_string()),
            ("password", password.to_string()),
            ("signedObject", token.to_string()),
            ("token", "DEF-456".to_string()),
            ("clientID", "C-123".to_string()),
            ("personID", "P-123".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn handler(
        config: &PartnerConfig,
        transport: RecordingTransport,
        directory: InMemoryDirectory,
    ) -> PartnerHandlerService<ConnectionService<RecordingTransport>, InMemoryDirectory> {
        PartnerHandlerService::new(
            config.signing_factory(),
            ConnectionService::new(config, transport),
            directory,
        )
    }

    fn expected_link() -> PartnerClientLink {
        PartnerClientLink {
            partner_client_id: "IEX-C-123".to_string(),
            client_id: "C-123".to_string(),
            person_id: "P-123".to_string(),
            token: "DEF-456".to_string(),
        }
    }

    // =============================================================================
    // Link Workflow
    // =============================================================================

    #[tokio::test]
    async fn test_link_request_happy_path() {
        let config = config("https://webapi.campminder.com/api/entity/partnerclient/");
        let transport = RecordingTransport::new(reply("True", ""));
        let directory = directory();
        let handler = handler(&config, transport.clone(), directory.clone());

        let outcome = handler
            .handle_client_link_request(&link_form("jdoe", "pa55word"))
            .await;

        assert_eq!(outcome, LinkOutcome::success());
        assert_eq!(directory.links(), vec![(expected_link(), true)]);
        assert_eq!(directory.links()[0].0.token, "DEF-456");

        // The outbound signed object carries the exact XML for this link
        let forms = transport.forms();
        assert_eq!(forms.len(), 1);
        let payload = config
            .signing_factory()
            .verify_signature(&forms[0].signed_object)
            .unwrap();
        let expected = ConnectionRequest::new("C-123", "P-123", "DEF-456", "IEX-C-123")
            .unwrap()
            .payload();
        assert_eq!(payload, expected.into_bytes());
    }

    #[tokio::test]
    async fn test_remote_refusal_is_stored_and_reported() {
        let config = config("https://webapi.campminder.com/api/entity/partnerclient/");
        let directory = directory();
        let handler = handler(
            &config,
            RecordingTransport::new(reply("False", "Unknown")),
            directory.clone(),
        );

        let outcome = handler
            .handle_client_link_request(&link_form("jdoe", "pa55word"))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Unknown");
        assert_eq!(directory.links(), vec![(expected_link(), false)]);
    }

    #[tokio::test]
    async fn test_wrong_password_never_reaches_campminder() {
        let config = config("https://webapi.campminder.com/api/entity/partnerclient/");
        let transport = RecordingTransport::new(reply("True", ""));
        let handler = handler(&config, transport.clone(), directory());

        let outcome = handler
            .handle_client_link_request(&link_form("jdoe", "guess"))
            .await;

        assert_eq!(outcome.reason, "invalid username and password");
        assert!(transport.forms().is_empty());
    }

    #[tokio::test]
    async fn test_user_without_partner_client() {
        let config = config("https://webapi.campminder.com/api/entity/partnerclient/");
        let handler = handler(&config, RecordingTransport::new(reply("True", "")), directory());

        let outcome = handler
            .handle_client_link_request(&link_form("orphan", "pa55word"))
            .await;

        assert_eq!(outcome.reason, "partner client id not found");
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let config = config("https://webapi.campminder.com/api/entity/partnerclient/");
        let directory = directory();
        let handler = handler(&config, RecordingTransport::new(reply("True", "")), directory.clone());

        let mut form = link_form("jdoe", "pa55word");
        let token = form["signedObject"].clone();
        form.insert("signedObject".to_string(), format!("A{}", token));

        let outcome = handler.handle_client_link_request(&form).await;
        assert_eq!(outcome.reason, "Invalid GetLinkRequest - signature was invalid!");
        assert!(directory.links().is_empty());
    }

    #[tokio::test]
    async fn test_link_over_http_stub() {
        let server = StubServer::respond(200, reply("True", "")).await.unwrap();
        let config = config(server.url());
        let directory = directory();
        let handler = PartnerHandlerService::new(
            config.signing_factory(),
            ConnectionService::from_config(&config).unwrap(),
            directory.clone(),
        );

        let response = handler
            .dispatch("ClientLinkRequest", &link_form("jdoe", "pa55word"))
            .await
            .unwrap();

        assert_eq!(response, HandlerResponse::Link(LinkOutcome::success()));
        assert_eq!(server.requests().len(), 1);
        assert_eq!(directory.links(), vec![(expected_link(), true)]);
    }

    #[tokio::test]
    async fn test_unreachable_campminder() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = config(&format!("http://{}/", addr));
        let directory = directory();
        let handler = PartnerHandlerService::new(
            config.signing_factory(),
            ConnectionService::from_config(&config).unwrap(),
            directory.clone(),
        );

        let outcome = handler
            .handle_client_link_request(&link_form("jdoe", "pa55word"))
            .await;

        assert_eq!(outcome.reason, "unable to reach CampMinder");
        assert!(directory.links().is_empty());
    }
}
