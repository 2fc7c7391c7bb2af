//! # Establish Connection (CM-02)
//!
//! Drives one outbound `EstablishConnection` round trip to the CampMinder
//! partner API: render the connection request as XML, sign it, POST it as a
//! form, and interpret the XML reply.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): configuration, `ConnectionRequest`, XML
//!   rendering, response parsing. No I/O.
//! - **Ports Layer** (`ports/`): `ConnectionApi` (inbound) and
//!   `PartnerTransport` (outbound)
//! - **Adapters** (`adapters/`): reqwest-backed HTTPS transport with optional proxy
//! - **Service Layer** (`service.rs`): `ConnectionService` and the per-call
//!   `EstablishConnection` state machine
//!
//! ## Outcome Handling
//!
//! | Remote reply | `connect()` |
//! |--------------|-------------|
//! | `status=True` | `Ok(true)`, no failure reason |
//! | `status=False` | `Ok(false)`, reason from `details` |
//! | anything else | `Err(ConnectionError::MalformedResponse)` |
//! | network fault / timeout | `Err(ConnectionError::Transport)` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::http::{HttpPartnerTransport, ProxySettings};
pub use domain::config::{ConfigError, PartnerConfig, TimeoutConfig};
pub use domain::connection_request::{ConnectionRequest, XmlDeclaration};
pub use domain::errors::ConnectionError;
pub use domain::response::{parse_response, ConnectionResult};
pub use ports::inbound::ConnectionApi;
pub use ports::outbound::{PartnerForm, PartnerTransport, TransportError, ESTABLISH_CONNECTION_FN};
pub use service::{ConnectionService, ConnectionState, EstablishConnection};
