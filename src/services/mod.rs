pub mod creative_merge;
pub mod exploration_builder;
pub mod export;
pub mod health_monitor;
pub mod patch_inference;
pub mod phase_controller;
pub mod results_calculator;
pub mod retry_cache;

pub use exploration_builder::{AxisSelection, MAX_EXPLORED_AXES};
pub use export::ExportBundle;
pub use health_monitor::HealthMonitor;
pub use patch_inference::KeywordPatchInferer;
pub use phase_controller::{PhaseController, PromptPreset, SessionState};
pub use retry_cache::{PendingAction, ReplayOutcome, RetryAction, RetryCache};
