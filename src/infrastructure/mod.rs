//! Infrastructure layer module
//!
//! This module contains the adapters to external systems:
//! - HTTP gateway to the backend service (reqwest)
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod backend;
pub mod config;
pub mod logging;
