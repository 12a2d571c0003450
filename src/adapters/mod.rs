//! Adapters implementing domain ports without external systems.

pub mod mock_backend;

pub use mock_backend::{GatewayCall, MockBackend, RecordedCall};
