//! # Domain Layer
//!
//! Connection request model, XML rendering, response parsing and
//! configuration. No I/O.

pub mod config;
pub mod connection_request;
pub mod errors;
pub mod response;
