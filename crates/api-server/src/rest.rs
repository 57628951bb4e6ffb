//! REST handlers for resource creation, the full pipeline and operational
//! endpoints.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_builder::{
    AccountScoped, AdRequest, AdSetRequest, CampaignRequest, CreativeRequest,
    FullCampaignRequest,
};
use campaign_core::assets::SyncedAssetStore;
use campaign_core::config::UploadConfig;
use campaign_core::credential::TokenStatus;
use campaign_core::types::{bare_account_id, Objective};
use campaign_core::{CampaignError, CampaignResult, Credential, CredentialProvider, PlatformErrorBody};
use campaign_graph::{AdPlatform, CreatedResource};
use campaign_pipeline::{
    check_pixel_permissions, resolve_timezone, CampaignPipeline, CreatedIds, CreatedResourceRef,
    PipelineOutcome, Stage,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{public_message, status_for, ApiJson, ApiResult};

/// Header carrying a token for a principal other than the configured one.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

const FULL_SUCCESS_MESSAGE: &str = "Campaign created successfully";
const FULL_PARTIAL_MESSAGE: &str =
    "Campaign creation failed. Some resources may have been created. Use created_ids for cleanup.";
const FULL_REJECTED_MESSAGE: &str = "Campaign creation failed. No resources were created.";

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn AdPlatform>,
    pub assets: Arc<dyn SyncedAssetStore>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub pipeline: Arc<CampaignPipeline>,
    pub uploads: UploadConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn AdPlatform>,
        assets: Arc<dyn SyncedAssetStore>,
        credentials: Arc<dyn CredentialProvider>,
        uploads: UploadConfig,
    ) -> Self {
        let pipeline = Arc::new(CampaignPipeline::new(platform.clone(), assets.clone()));
        Self {
            platform,
            assets,
            credentials,
            pipeline,
            uploads,
            start_time: Instant::now(),
        }
    }

    /// The credential this request acts with. A token in the
    /// `x-access-token` header wins over the provider's; neither is stored.
    fn principal(&self, headers: &HeaderMap) -> CampaignResult<Credential> {
        let header_token = headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = header_token {
            return Ok(Credential::new(token));
        }

        let credential = self.credentials.credential().ok_or_else(|| {
            CampaignError::Credential("No access token configured".to_string())
        })?;
        if credential.is_expired_at(Utc::now()) {
            return Err(CampaignError::Credential(
                "Access token has expired; reconnect the account".to_string(),
            ));
        }
        Ok(credential)
    }
}

fn record(endpoint: &'static str) {
    metrics::counter!("api.requests", "endpoint" => endpoint).increment(1);
}

fn require_account(id: &str) -> CampaignResult<&str> {
    let id = bare_account_id(id.trim());
    if id.is_empty() {
        return Err(CampaignError::validation("adAccountId is required"));
    }
    Ok(id)
}

fn require_field(value: Option<String>, name: &str) -> CampaignResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CampaignError::validation(format!("{name} is required")))
}

fn created_body(id_field: &str, created: CreatedResource) -> Json<Value> {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(id_field.to_string(), Value::String(created.id));
    body.insert("data".to_string(), created.raw);
    Json(Value::Object(body))
}

// ─── Single resources ───────────────────────────────────────────────────────

/// POST /api/campaigns/create
pub async fn create_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<CampaignRequest>>,
) -> ApiResult<Json<Value>> {
    record("campaigns.create");
    let account_id = require_account(&request.ad_account_id)?;
    let spec = request.body.into_spec()?;
    let credential = state.principal(&headers)?;

    let created = state
        .platform
        .create_campaign(&credential, account_id, &spec)
        .await?;
    info!(account_id = %account_id, resource_id = %created.id, "Campaign created");
    Ok(created_body("campaign_id", created))
}

/// POST /api/adsets/create — standalone ad set under an existing campaign.
pub async fn create_ad_set(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<AdSetRequest>>,
) -> ApiResult<Json<Value>> {
    record("adsets.create");
    let account_id = require_account(&request.ad_account_id)?;
    let mut body = request.body;
    let campaign_id = require_field(body.campaign_id.take(), "campaign_id")?;
    let objective = require_field(body.campaign_objective.take(), "campaign_objective")?
        .parse::<Objective>()
        .map_err(CampaignError::validation)?;

    let timezone = resolve_timezone(state.assets.as_ref(), account_id, body.timezone.as_deref())?;
    let spec = body.into_spec(objective, timezone)?;
    check_pixel_permissions(state.assets.as_ref(), account_id, spec.promoted_object.as_ref())?;
    let credential = state.principal(&headers)?;

    let created = state
        .platform
        .create_ad_set(&credential, account_id, &campaign_id, objective, &spec)
        .await?;
    info!(
        account_id = %account_id,
        campaign_id = %campaign_id,
        resource_id = %created.id,
        "Ad set created"
    );
    Ok(created_body("adset_id", created))
}

/// POST /api/creatives/create
pub async fn create_creative(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<CreativeRequest>>,
) -> ApiResult<Json<Value>> {
    record("creatives.create");
    let account_id = require_account(&request.ad_account_id)?;
    let spec = request.body.into_spec()?;
    let credential = state.principal(&headers)?;

    let created = state
        .platform
        .create_creative(&credential, account_id, &spec)
        .await?;
    info!(account_id = %account_id, resource_id = %created.id, "Creative created");
    Ok(created_body("creative_id", created))
}

/// POST /api/creatives/create-with-placements
pub async fn create_placement_creative(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<CreativeRequest>>,
) -> ApiResult<Json<Value>> {
    record("creatives.create_with_placements");
    let account_id = require_account(&request.ad_account_id)?;
    let spec = request.body.into_spec()?;
    let credential = state.principal(&headers)?;

    let created = state
        .platform
        .create_placement_creative(&credential, account_id, &spec)
        .await?;
    info!(
        account_id = %account_id,
        resource_id = %created.id,
        "Placement-customized creative created"
    );
    Ok(created_body("creative_id", created))
}

/// POST /api/ads/create
pub async fn create_ad(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<AdRequest>>,
) -> ApiResult<Json<Value>> {
    record("ads.create");
    let account_id = require_account(&request.ad_account_id)?;
    let mut body = request.body;
    let adset_id = require_field(body.adset_id.take(), "adset_id")?;
    let creative_id = require_field(body.creative_id.take(), "creative_id")?;
    let spec = body.into_spec()?;
    let credential = state.principal(&headers)?;

    let created = state
        .platform
        .create_ad(&credential, account_id, &adset_id, &creative_id, &spec)
        .await?;
    info!(account_id = %account_id, resource_id = %created.id, "Ad created");
    Ok(created_body("ad_id", created))
}

// ─── Images ─────────────────────────────────────────────────────────────────

fn malformed_upload(e: axum::extract::multipart::MultipartError) -> CampaignError {
    CampaignError::validation(format!("Malformed upload: {}", e.body_text()))
}

/// POST /api/images/upload — multipart with an `image` file and `adAccountId`.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    record("images.upload");
    let mut account_id: Option<String> = None;
    let mut image: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed_upload)?;
                image = Some((bytes.to_vec(), file_name));
            }
            "adAccountId" | "ad_account_id" => {
                account_id = Some(field.text().await.map_err(malformed_upload)?);
            }
            _ => {}
        }
    }

    let account_id = require_account(account_id.as_deref().unwrap_or_default())?;
    let (bytes, file_name) = image
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| CampaignError::validation("No image file provided"))?;
    if bytes.len() > state.uploads.max_image_bytes {
        return Err(CampaignError::validation(format!(
            "Image exceeds the {} byte upload limit",
            state.uploads.max_image_bytes
        ))
        .into());
    }
    let credential = state.principal(&headers)?;

    let size = bytes.len();
    let uploaded = state
        .platform
        .upload_image(&credential, account_id, bytes, file_name.as_deref())
        .await?;
    info!(account_id = %account_id, bytes = size, image_hash = %uploaded.hash, "Image uploaded");
    Ok(Json(json!({
        "success": true,
        "image_hash": uploaded.hash,
        "url": uploaded.url,
        "data": uploaded.raw,
    })))
}

// ─── Full pipeline ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FullCampaignResponse {
    pub success: bool,
    pub message: &'static str,
    pub ids: CreatedIds,
    pub run_id: Uuid,
    /// Raw platform response per stage.
    pub data: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct FullCampaignFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<PlatformErrorBody>,
    pub created_ids: CreatedIds,
    pub created_resources: Vec<CreatedResourceRef>,
    pub failed_stage: Stage,
    pub run_id: Uuid,
    pub message: &'static str,
}

/// POST /api/campaigns/create-full — campaign, ad set, creative and ad in
/// one submission.
pub async fn create_full(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AccountScoped<FullCampaignRequest>>,
) -> ApiResult<Response> {
    record("campaigns.create_full");
    let credential = state.principal(&headers)?;

    let outcome = state
        .pipeline
        .run(&credential, &request.ad_account_id, request.body)
        .await;

    let response = match outcome {
        PipelineOutcome::Succeeded(run) => {
            let data = run
                .responses
                .into_iter()
                .map(|(stage, raw)| (stage.as_str().to_string(), raw))
                .collect();
            Json(FullCampaignResponse {
                success: true,
                message: FULL_SUCCESS_MESSAGE,
                ids: run.created,
                run_id: run.run_id,
                data,
            })
            .into_response()
        }
        PipelineOutcome::FailedPartial(failure) => {
            let status = status_for(&failure.error);
            let message = if failure.created.is_empty() {
                FULL_REJECTED_MESSAGE
            } else {
                warn!(
                    run_id = %failure.run_id,
                    stage = %failure.failed_stage,
                    created = ?failure.created,
                    "Submission left resources behind"
                );
                FULL_PARTIAL_MESSAGE
            };
            let body = FullCampaignFailure {
                success: false,
                error: public_message(&failure.error),
                error_details: failure.error.platform_body().cloned(),
                created_resources: failure.created.resources(),
                created_ids: failure.created,
                failed_stage: failure.failed_stage,
                run_id: failure.run_id,
                message,
            };
            (status, Json(body)).into_response()
        }
    };
    Ok(response)
}

// ─── Operational ────────────────────────────────────────────────────────────

/// GET /api/token/status
pub async fn token_status(State(state): State<AppState>) -> Json<TokenStatus> {
    Json(state.credentials.status())
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// Fallback for unknown routes, in the same envelope as other failures.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": "Not found"})),
    )
}
