//! HTTP gateway to the planning/creative/scoring service.

pub mod client;
pub mod error;

pub use client::HttpBackendGateway;
pub use error::{extract_error_message, transport_error};
