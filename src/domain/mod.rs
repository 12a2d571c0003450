//! Domain layer: workflow entities, errors and the ports the core calls through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
