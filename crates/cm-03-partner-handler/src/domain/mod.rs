//! # Domain Layer

pub mod link_request;
pub mod outcome;
pub mod server_time;
