//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod http;
