//! # Partner Configuration
//!
//! Process-wide settings for talking to CampMinder. Built once at startup and
//! passed to the services; never mutated afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `CAMPMINDER_SECRET_CODE` | yes | |
//! | `CAMPMINDER_BUSINESS_PARTNER_ID` | yes | |
//! | `CAMPMINDER_WEB_SERVICE_URL` | yes | |
//! | `CAMPMINDER_PROXY_URL` | no | blank = direct connection |
//! | `CAMPMINDER_CONNECT_TIMEOUT_SECS` | no | 5 |
//! | `CAMPMINDER_REQUEST_TIMEOUT_SECS` | no | 15 |
//! | `CAMPMINDER_LINK_MAX_AGE_SECS` | no | 5 |
//! | `CAMPMINDER_LINK_MAX_FUTURE_SECS` | no | 600 |

use std::time::Duration;

use cm_01_signed_request::{FreshnessWindow, SharedSecret, SignedRequestFactory, MAX_WINDOW_SECS};
use reqwest::Url;
use thiserror::Error;

pub const ENV_SECRET_CODE: &str = "CAMPMINDER_SECRET_CODE";
pub const ENV_BUSINESS_PARTNER_ID: &str = "CAMPMINDER_BUSINESS_PARTNER_ID";
pub const ENV_WEB_SERVICE_URL: &str = "CAMPMINDER_WEB_SERVICE_URL";
pub const ENV_PROXY_URL: &str = "CAMPMINDER_PROXY_URL";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "CAMPMINDER_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CAMPMINDER_REQUEST_TIMEOUT_SECS";
pub const ENV_LINK_MAX_AGE_SECS: &str = "CAMPMINDER_LINK_MAX_AGE_SECS";
pub const ENV_LINK_MAX_FUTURE_SECS: &str = "CAMPMINDER_LINK_MAX_FUTURE_SECS";

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Shared secret must not be empty")]
    EmptySecret,

    #[error("Business partner ID must not be empty")]
    EmptyBusinessPartnerId,

    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{0} must be an https URL")]
    InsecureUrl(&'static str),

    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Link freshness window must be 0..={max} seconds (max age {max_age}, max future {max_future})", max = MAX_WINDOW_SECS)]
    LinkWindowOutOfRange { max_age: i64, max_future: i64 },
}

/// Connect and whole-request timeouts for the outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// TCP + TLS handshake budget
    pub connect: Duration,
    /// Budget for the complete request, body included
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(15),
        }
    }
}

/// Everything the core needs from the host to talk to CampMinder.
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    /// Shared secret used for signing and verification
    pub secret: SharedSecret,
    /// Registered business partner account, sent with every request
    pub business_partner_id: String,
    /// Partner service endpoint
    pub web_service_url: Url,
    /// Optional forward proxy; credentials may be embedded in the URL
    pub proxy_url: Option<Url>,
    /// Outbound timeouts
    pub timeouts: TimeoutConfig,
    /// Freshness window for inbound link-request tokens
    pub link_window: FreshnessWindow,
}

impl PartnerConfig {
    /// Build a configuration with default timeouts, window and no proxy.
    pub fn new(
        secret: impl AsRef<[u8]>,
        business_partner_id: impl Into<String>,
        web_service_url: &str,
    ) -> Result<Self, ConfigError> {
        let secret = SharedSecret::new(secret).map_err(|_| ConfigError::EmptySecret)?;
        let config = Self {
            secret,
            business_partner_id: business_partner_id.into(),
            web_service_url: parse_url(ENV_WEB_SERVICE_URL, web_service_url)?,
            proxy_url: None,
            timeouts: TimeoutConfig::default(),
            link_window: FreshnessWindow::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Route outbound traffic through `proxy_url`. A blank value clears it.
    pub fn with_proxy(mut self, proxy_url: &str) -> Result<Self, ConfigError> {
        self.proxy_url = if proxy_url.trim().is_empty() {
            None
        } else {
            Some(parse_url(ENV_PROXY_URL, proxy_url.trim())?)
        };
        Ok(self)
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_link_window(mut self, window: FreshnessWindow) -> Self {
        self.link_window = window;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let mut config = Self::new(
            required(ENV_SECRET_CODE)?,
            required(ENV_BUSINESS_PARTNER_ID)?,
            &required(ENV_WEB_SERVICE_URL)?,
        )?;

        if let Some(proxy) = lookup(ENV_PROXY_URL) {
            config = config.with_proxy(&proxy)?;
        }

        let defaults = TimeoutConfig::default();
        config.timeouts = TimeoutConfig {
            connect: secs_or(&lookup, ENV_CONNECT_TIMEOUT_SECS, defaults.connect)?,
            request: secs_or(&lookup, ENV_REQUEST_TIMEOUT_SECS, defaults.request)?,
        };

        config.link_window = link_window_from_lookup(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    /// Link freshness window from `CAMPMINDER_LINK_MAX_*` alone, for tools
    /// that verify tokens without the rest of the configuration.
    pub fn link_window_from_env() -> Result<FreshnessWindow, ConfigError> {
        link_window_from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Structural checks that hold in every environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.business_partner_id.trim().is_empty() {
            return Err(ConfigError::EmptyBusinessPartnerId);
        }
        check_link_window(&self.link_window)
    }

    /// Production checks: the partner endpoint must be reached over TLS.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.web_service_url.scheme() != "https" {
            return Err(ConfigError::InsecureUrl(ENV_WEB_SERVICE_URL));
        }
        Ok(())
    }

    /// A signing factory keyed with this configuration's secret and window.
    pub fn signing_factory(&self) -> SignedRequestFactory {
        SignedRequestFactory::from_secret(self.secret.clone()).with_window(self.link_window)
    }
}

fn check_link_window(window: &FreshnessWindow) -> Result<(), ConfigError> {
    if !window.is_bounded() {
        return Err(ConfigError::LinkWindowOutOfRange {
            max_age: window.max_age().num_seconds(),
            max_future: window.max_future().num_seconds(),
        });
    }
    Ok(())
}

fn link_window_from_lookup<F>(lookup: &F) -> Result<FreshnessWindow, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = FreshnessWindow::default();
    let window = FreshnessWindow::new(
        chrono_secs_or(lookup, ENV_LINK_MAX_AGE_SECS, defaults.max_age())?,
        chrono_secs_or(lookup, ENV_LINK_MAX_FUTURE_SECS, defaults.max_future())?,
    );
    check_link_window(&window)?;
    Ok(window)
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: "URL has no host".to_string(),
        });
    }
    Ok(url)
}

fn parse_secs<F>(lookup: &F, field: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(field) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { field, value }),
    }
}

fn secs_or<F>(lookup: &F, field: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_secs(lookup, field)?
        .map(Duration::from_secs)
        .unwrap_or(default))
}

fn chrono_secs_or<F>(
    lookup: &F,
    field: &'static str,
    default: chrono::Duration,
) -> Result<chrono::Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_secs(lookup, field)? {
        None => Ok(default),
        Some(secs) => i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or(ConfigError::InvalidNumber {
                field,
                value: secs.to_string(),
            }),
    }
}
