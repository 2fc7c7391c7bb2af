//! # Ports Layer
//!
//! - **Inbound (Driving)**: `ConnectionApi`, what the host and other crates call
//! - **Outbound (Driven)**: `PartnerTransport`, how a form reaches CampMinder

pub mod inbound;
pub mod outbound;
