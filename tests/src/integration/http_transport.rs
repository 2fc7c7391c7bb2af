//! # HTTP Transport Integration
//!
//! Drives `HttpPartnerTransport` and `ConnectionService` against a local
//! plain-HTTP server to check what goes over the wire.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cm_01_signed_request::SignedRequestApi;
    use cm_02_establish_connection::{
        ConnectionError, ConnectionRequest, ConnectionService, HttpPartnerTransport,
        PartnerConfig, TimeoutConfig, TransportError,
    };

    use crate::integration::support::{reply, StubServer, BUSINESS_PARTNER_ID, SECRET};

    fn config(url: &str) -> PartnerConfig {
        PartnerConfig::new(SECRET, BUSINESS_PARTNER_ID, url).unwrap()
    }

    fn request() -> ConnectionRequest {
        ConnectionRequest::new("C-123", "P-123", "DEF-456", "IEX-C-123").unwrap()
    }

    #[tokio::test]
    async fn test_connect_true_over_http() {
        let server = StubServer::respond(200, reply("True", "")).await.unwrap();
        let service = ConnectionService::from_config(&config(server.url())).unwrap();

        let mut call = service.begin(request());
        assert_eq!(call.connect().await, Ok(true));
        assert_eq!(call.connection_failure_reason(), None);
    }

    #[tokio::test]
    async fn test_connect_false_over_http_reports_reason() {
        let server = StubServer::respond(200, reply("False", "Unknown")).await.unwrap();
        let service = ConnectionService::from_config(&config(server.url())).unwrap();

        let mut call = service.begin(request());
        assert_eq!(call.connect().await, Ok(false));
        assert_eq!(call.connection_failure_reason(), Some("Unknown"));
    }

    #[tokio::test]
    async fn test_wire_form_fields() {
        let server = StubServer::respond(200, reply("True", "")).await.unwrap();
        let service = ConnectionService::from_config(&config(server.url())).unwrap();

        let mut call = service.begin(request());
        let signed = call.signed_object().to_string();
        call.connect().await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];

        assert!(sent.request_line().starts_with("POST /api/entity/partnerclient/"));
        assert_eq!(
            sent.header("content-type").as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(sent.form_value("fn").as_deref(), Some("EstablishConnection"));
        assert_eq!(
            sent.form_value("businessPartnerID").as_deref(),
            Some(BUSINESS_PARTNER_ID)
        );
        // base64url and '.' survive form encoding untouched
        assert_eq!(sent.form_value("signedObject"), Some(signed.clone()));
        assert!(service.signer().verify(&signed));
    }

    #[tokio::test]
    async fn test_non_2xx_is_transport_error() {
        let server = StubServer::respond(500, "oops").await.unwrap();
        let service = ConnectionService::from_config(&config(server.url())).unwrap();

        let mut call = service.begin(request());
        assert_eq!(
            call.connect().await,
            Err(ConnectionError::Transport(TransportError::UnexpectedStatus {
                status: 500
            }))
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let server = StubServer::respond(200, "<html>maintenance</html>").await.unwrap();
        let service = ConnectionService::from_config(&config(server.url())).unwrap();

        let mut call = service.begin(request());
        assert!(matches!(
            call.connect().await,
            Err(ConnectionError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = StubServer::hang().await.unwrap();
        let config = config(server.url()).with_timeouts(TimeoutConfig {
            connect: Duration::from_secs(1),
            request: Duration::from_millis(300),
        });
        let service = ConnectionService::from_config(&config).unwrap();

        let mut call = service.begin(request());
        assert_eq!(
            call.connect().await,
            Err(ConnectionError::Transport(TransportError::Timeout))
        );
    }

    #[tokio::test]
    async fn test_refused_connection() {
        // Bind then release a port so nothing is listening on it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/api/entity/partnerclient/", addr);
        let service = ConnectionService::from_config(&config(&url)).unwrap();

        let mut call = service.begin(request());
        assert!(matches!(
            call.connect().await,
            Err(ConnectionError::Transport(TransportError::Connect(_)))
        ));
    }

    #[tokio::test]
    async fn test_proxy_receives_request_with_credentials() {
        let proxy = StubServer::respond(200, reply("True", "")).await.unwrap();
        let config = config("http://webapi.campminder.test/api/entity/partnerclient/")
            .with_proxy(&format!("http://user:pass@{}", proxy.authority()))
            .unwrap();

        let transport = HttpPartnerTransport::new(&config).unwrap();
        let settings = transport.proxy().unwrap();
        assert_eq!(settings.username.as_deref(), Some("user"));
        assert_eq!(settings.password.as_deref(), Some("pass"));

        let service = ConnectionService::new(&config, transport);
        let mut call = service.begin(request());
        assert_eq!(call.connect().await, Ok(true));

        let requests = proxy.requests();
        assert_eq!(requests.len(), 1);
        // Absolute-form request line: the proxy is asked to forward it
        assert!(requests[0]
            .request_line()
            .starts_with("POST http://webapi.campminder.test/api/entity/partnerclient/"));
        assert_eq!(
            requests[0].header("proxy-authorization").as_deref(),
            Some("Basic dXNlcjpwYXNz")
        );
    }
}
