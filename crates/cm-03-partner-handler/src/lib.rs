//! # Partner Handler (CM-03)
//!
//! Core of the inbound CampMinder endpoint. The host application owns HTTP
//! routing, sessions and redirects; this crate takes the posted form fields
//! and decides the outcome.
//!
//! ## ClientLinkRequest
//!
//! 1. Verify the time-bound `signedObject`
//! 2. Check the user's credentials with the host (`PartnerDirectory`)
//! 3. Look up the user's partner client ID
//! 4. Run EstablishConnection against CampMinder
//! 5. Hand the link and the connection status back to the host for storage
//!
//! The first failing step decides the `LinkOutcome` reason. A remote
//! `status=False` still stores the link, flagged as not connected.
//!
//! ## ServerTimeGet
//!
//! Returns the current UTC time in a `responseObject` document.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::link_request::ClientLinkRequest;
pub use domain::outcome::{LinkFailure, LinkOutcome};
pub use domain::server_time::{render_server_time, SERVER_TIME_GET_FN};
pub use ports::inbound::{HandlerError, HandlerResponse, PartnerHandlerApi};
pub use ports::outbound::{DirectoryError, PartnerClientLink, PartnerDirectory};
pub use service::{PartnerHandlerService, CLIENT_LINK_REQUEST_FN};
