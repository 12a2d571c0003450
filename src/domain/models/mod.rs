pub mod config;
pub mod creative;
pub mod exploration;
pub mod fibo;
pub mod plan;
pub mod results;
pub mod score;
pub mod session;
pub mod snapshot;

pub use config::{BackendConfig, Config, ExplorationConfig, LoggingConfig};
pub use creative::{
    Creative, CreativeAudit, CreativeSet, GuardrailStatus, GuardrailsReport, ImageStatus,
};
pub use exploration::{
    AxisGrid, ExplorationGrid, ExploreMeta, ExploreVariantsRequest, ExploreVariantsResponse,
};
pub use fibo::{FiboSpec, SpecPatch, VisualAxis};
pub use plan::{ExperimentPlan, PlanVariant, SampleSizeRule};
pub use results::{
    coerce_number, Recommendation, ResultField, ResultRow, ResultsSubmission, VariantResult,
};
pub use score::{score_for, Score};
pub use session::{BackendHealth, BackendMode, ErrorKind, LinkStatus, Phase, SessionError};
pub use snapshot::{Audience, BusinessSnapshot, Guardrails, Product, SnapshotDraft};
