//! # Domain Layer
//!
//! Pure signing logic with no I/O dependencies.

pub mod encoding;
pub mod entities;
pub mod errors;
pub mod freshness;
pub mod mac;
