//! Cross-crate integration tests.

pub mod flows;
pub mod http_transport;
pub mod support;
