//! # Ports Layer
//!
//! - **Inbound (Driving)**: the signing API other crates depend on

pub mod inbound;
