//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the workflow core depends on:
//! - BackendGateway: the remote planning/creative/scoring service
//! - PatchInferer: prompt override to spec patch inference
//!
//! Adapters in `infrastructure` and `adapters` implement them.

pub mod backend_gateway;
pub mod errors;
pub mod patch_inference;

pub use backend_gateway::{
    ApplyGuardrailsRequest, BackendGateway, GatewayResult, GuardrailFix, HealthReport,
    RegenerateImageRequest,
};
pub use errors::GatewayError;
pub use patch_inference::{InferredPatch, PatchInferer};
