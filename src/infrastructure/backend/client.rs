//! reqwest implementation of [`BackendGateway`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::{extract_error_message, transport_error};
use crate::domain::models::{
    BackendConfig, BusinessSnapshot, Creative, ExperimentPlan, ExploreVariantsRequest,
    ExploreVariantsResponse, Recommendation, ResultsSubmission, Score,
};
use crate::domain::ports::{
    ApplyGuardrailsRequest, BackendGateway, GatewayError, GatewayResult, GuardrailFix,
    HealthReport, RegenerateImageRequest,
};

const EXPERIMENT_PLAN: &str = "/experiment-plan";
const CREATIVE_VARIANTS: &str = "/creative-variants";
const SCORE_CREATIVES: &str = "/score-creatives";
const REGENERATE_IMAGE: &str = "/regenerate-image";
const APPLY_GUARDRAILS: &str = "/apply-guardrails";
const EXPLORE_VARIANTS: &str = "/explore-variants";
const RESULTS: &str = "/results";
const HEALTH: &str = "/health";

/// JSON-over-HTTP client for the backend service.
///
/// Every call is a single attempt: retries are the operator's decision and
/// go through the retry cache.
#[derive(Debug, Clone)]
pub struct HttpBackendGateway {
    http_client: ReqwestClient,
    base_url: String,
    health_timeout: Duration,
}

impl HttpBackendGateway {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_millis(config.health_timeout_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> GatewayResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e, &self.base_url))?;

        self.handle_response(response).await
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: Response) -> GatewayResult<R> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(status.as_u16(), &body);
            warn!(status = status.as_u16(), message = %message, "backend request failed");
            return Err(GatewayError::request(status.as_u16(), message));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| match transport_error(&e, &self.base_url) {
                GatewayError::Unreachable { .. } => GatewayError::Decode(e.to_string()),
                other => other,
            })
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    #[instrument(skip_all, fields(products = snapshot.products.len()))]
    async fn create_plan(&self, snapshot: &BusinessSnapshot) -> GatewayResult<ExperimentPlan> {
        self.post(EXPERIMENT_PLAN, snapshot).await
    }

    #[instrument(skip_all, fields(experiment_id = %plan.experiment_id))]
    async fn generate_creatives(&self, plan: &ExperimentPlan) -> GatewayResult<Vec<Creative>> {
        self.post(CREATIVE_VARIANTS, plan).await
    }

    #[instrument(skip_all, fields(count = creatives.len()))]
    async fn score_creatives(&self, creatives: &[Creative]) -> GatewayResult<Vec<Score>> {
        self.post(SCORE_CREATIVES, creatives).await
    }

    #[instrument(skip_all, fields(variant_id = %request.variant.variant_id))]
    async fn regenerate_image(&self, request: &RegenerateImageRequest) -> GatewayResult<Creative> {
        self.post(REGENERATE_IMAGE, request).await
    }

    #[instrument(skip_all, fields(variant_id = %request.variant.variant_id))]
    async fn apply_guardrails(
        &self,
        request: &ApplyGuardrailsRequest,
    ) -> GatewayResult<GuardrailFix> {
        self.post(APPLY_GUARDRAILS, request).await
    }

    #[instrument(skip_all, fields(variant_id = %request.base_variant.variant_id, axes = request.axes.len()))]
    async fn explore_variants(
        &self,
        request: &ExploreVariantsRequest,
    ) -> GatewayResult<ExploreVariantsResponse> {
        self.post(EXPLORE_VARIANTS, request).await
    }

    #[instrument(skip_all, fields(experiment_id = %submission.experiment_id))]
    async fn submit_results(&self, submission: &ResultsSubmission) -> GatewayResult<Recommendation> {
        self.post(RESULTS, submission).await
    }

    #[instrument(skip(self))]
    async fn check_health(&self) -> GatewayResult<HealthReport> {
        let response = self
            .http_client
            .get(self.url(HEALTH))
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e, &self.base_url))?;

        self.handle_response(response).await
    }
}
