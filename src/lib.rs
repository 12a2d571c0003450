//! Adloop - ad creative experimentation loop
//!
//! Adloop drives one round of an ad-creative experiment against a remote
//! planning/creative/scoring service: a business snapshot becomes an
//! experiment plan, the plan becomes creatives, creatives are regenerated,
//! fixed and explored, and operator-entered results come back as a
//! next-round recommendation.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): workflow entities, errors and port traits
//! - **Service Layer** (`services`): the phase controller and the pure
//!   calculations it delegates to
//! - **Adapters** (`adapters`): the in-process mock backend
//! - **Infrastructure Layer** (`infrastructure`): HTTP gateway, configuration, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use adloop::adapters::MockBackend;
//! use adloop::domain::models::SnapshotDraft;
//! use adloop::services::PhaseController;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut controller = PhaseController::new(Arc::new(MockBackend::new()));
//! controller.create_plan(SnapshotDraft::default().into_snapshot()).await?;
//! controller.generate_creatives().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    BackendHealth, BusinessSnapshot, Config, Creative, ExperimentPlan, Phase, Recommendation,
    SnapshotDraft,
};
pub use domain::ports::{BackendGateway, GatewayError};
pub use infrastructure::backend::HttpBackendGateway;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{HealthMonitor, PhaseController, RetryCache};
