//! HTTPS transport backed by `reqwest`.
//!
//! One client per transport; connection pooling is reqwest's. When the
//! configuration names a proxy, every request goes through it with the
//! proxy's embedded credentials as basic auth.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::domain::config::{ConfigError, PartnerConfig};
use crate::ports::outbound::{PartnerForm, PartnerTransport, TransportError};

// =============================================================================
// Proxy Settings
// =============================================================================

/// Forward proxy coordinates extracted from a proxy URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    /// Split `url` into host, port and credentials.
    pub fn from_url(url: &Url) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUrl {
            field: crate::domain::config::ENV_PROXY_URL,
            reason: reason.to_string(),
        };

        let host = url.host_str().ok_or_else(|| invalid("URL has no host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("URL has no port"))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
            username: Some(url.username())
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            password: url.password().map(str::to_string),
        })
    }

    /// Proxy address without credentials.
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    fn to_reqwest(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        let proxy = reqwest::Proxy::all(self.endpoint())?;
        Ok(match &self.username {
            Some(user) => proxy.basic_auth(user, self.password.as_deref().unwrap_or_default()),
            None => proxy,
        })
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// =============================================================================
// Transport
// =============================================================================

/// `PartnerTransport` over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPartnerTransport {
    client: Client,
    endpoint: Url,
    proxy: Option<ProxySettings>,
}

impl HttpPartnerTransport {
    /// Build a client honouring the configured proxy and timeouts.
    pub fn new(config: &PartnerConfig) -> Result<Self, TransportError> {
        let proxy = config
            .proxy_url
            .as_ref()
            .map(ProxySettings::from_url)
            .transpose()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        let mut builder = Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect);

        // Only the configured proxy is used; HTTP(S)_PROXY variables are ignored
        builder = match &proxy {
            Some(settings) => {
                let reqwest_proxy = settings
                    .to_reqwest()
                    .map_err(|e| TransportError::Build(e.to_string()))?;
                debug!(proxy = %settings.endpoint(), "Routing partner traffic through proxy");
                builder.proxy(reqwest_proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.web_service_url.clone(),
            proxy,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Proxy in use, if any.
    pub fn proxy(&self) -> Option<&ProxySettings> {
        self.proxy.as_ref()
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Http(error.to_string())
    }
}

#[async_trait]
impl PartnerTransport for HttpPartnerTransport {
    async fn post_form(&self, form: &PartnerForm) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form.fields())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(map_reqwest_error)
    }
}
