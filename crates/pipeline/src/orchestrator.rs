//! Fixed four-step creation pipeline: campaign → ad set → creative → ad.
//!
//! Every spec is validated before the first request goes out. Requests are
//! issued strictly in order, each stage feeding its id to the next. A failed
//! stage halts the run; resources already created are left in place and
//! reported back so they can be cleaned up.

use campaign_builder::FullCampaignRequest;
use campaign_core::assets::SyncedAssetStore;
use campaign_core::spec::{AdSetSpec, AdSpec, CampaignSpec, CreativeSpec};
use campaign_core::types::bare_account_id;
use campaign_core::{CampaignError, CampaignResult, Credential};
use campaign_graph::{AdPlatform, CreatedResource};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::resolve::{check_pixel_permissions, resolve_timezone};
use crate::stage::{CreatedIds, PartialFailure, PipelineOutcome, PipelineRun, Stage};

/// All four specs of a submission, validated.
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    pub account_id: String,
    pub campaign: CampaignSpec,
    pub ad_set: AdSetSpec,
    pub creative: CreativeSpec,
    pub ad: AdSpec,
}

/// A rejection attributed to the stage whose input caused it.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: CampaignError,
}

fn at(stage: Stage) -> impl FnOnce(CampaignError) -> StageError {
    move |error| StageError { stage, error }
}

pub struct CampaignPipeline {
    platform: Arc<dyn AdPlatform>,
    assets: Arc<dyn SyncedAssetStore>,
}

impl CampaignPipeline {
    pub fn new(platform: Arc<dyn AdPlatform>, assets: Arc<dyn SyncedAssetStore>) -> Self {
        Self { platform, assets }
    }

    /// Validate and convert every part of the submission.
    pub fn prepare(
        &self,
        account_id: &str,
        request: FullCampaignRequest,
    ) -> Result<PreparedSubmission, StageError> {
        let account_id = bare_account_id(account_id);
        if account_id.is_empty() {
            return Err(StageError {
                stage: Stage::Campaign,
                error: CampaignError::validation("adAccountId is required"),
            });
        }

        let campaign = request.campaign.into_spec().map_err(at(Stage::Campaign))?;

        let timezone = resolve_timezone(
            self.assets.as_ref(),
            account_id,
            request.adset.timezone.as_deref(),
        )
        .map_err(at(Stage::AdSet))?;
        let ad_set = request
            .adset
            .into_spec(campaign.objective, timezone)
            .map_err(at(Stage::AdSet))?;
        check_pixel_permissions(
            self.assets.as_ref(),
            account_id,
            ad_set.promoted_object.as_ref(),
        )
        .map_err(at(Stage::AdSet))?;

        let creative = request.creative.into_spec().map_err(at(Stage::Creative))?;
        let ad = request.ad.into_spec().map_err(at(Stage::Ad))?;

        Ok(PreparedSubmission {
            account_id: account_id.to_string(),
            campaign,
            ad_set,
            creative,
            ad,
        })
    }

    /// Validate the submission, then create all four resources.
    pub async fn run(
        &self,
        credential: &Credential,
        account_id: &str,
        request: FullCampaignRequest,
    ) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        metrics::counter!("pipeline.runs").increment(1);

        match self.prepare(account_id, request) {
            Ok(prepared) => self.execute(run_id, credential, &prepared).await,
            Err(StageError { stage, error }) => {
                warn!(run_id = %run_id, stage = %stage, error = %error, "Submission rejected before any request");
                fail(run_id, stage, CreatedIds::default(), error)
            }
        }
    }

    /// Create the prepared resources in order. The credential snapshot is
    /// used for every call of the run.
    pub async fn execute(
        &self,
        run_id: Uuid,
        credential: &Credential,
        prepared: &PreparedSubmission,
    ) -> PipelineOutcome {
        let started = Instant::now();
        let account_id = prepared.account_id.as_str();
        let mut created = CreatedIds::default();
        let mut responses = Vec::with_capacity(Stage::ORDER.len());

        info!(
            run_id = %run_id,
            account_id = %account_id,
            campaign = %prepared.campaign.name,
            placement_customized = prepared.creative.is_placement_customized(),
            "Campaign pipeline started"
        );

        for stage in Stage::ORDER {
            let result = self
                .create_stage(stage, credential, prepared, &created)
                .await;
            match result {
                Ok(resource) => {
                    info!(run_id = %run_id, stage = %stage, resource_id = %resource.id, "Stage complete");
                    created.record(stage, resource.id);
                    responses.push((stage, resource.raw));
                }
                Err(error) => {
                    warn!(
                        run_id = %run_id,
                        stage = %stage,
                        created = ?created,
                        error = %error,
                        "Campaign pipeline halted; created resources left in place"
                    );
                    return fail(run_id, stage, created, error);
                }
            }
        }

        metrics::counter!("pipeline.succeeded").increment(1);
        info!(
            run_id = %run_id,
            campaign_id = ?created.campaign_id,
            ad_id = ?created.ad_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Campaign pipeline succeeded"
        );
        PipelineOutcome::Succeeded(PipelineRun {
            run_id,
            created,
            responses,
        })
    }

    async fn create_stage(
        &self,
        stage: Stage,
        credential: &Credential,
        prepared: &PreparedSubmission,
        created: &CreatedIds,
    ) -> CampaignResult<CreatedResource> {
        let account_id = prepared.account_id.as_str();
        let parent = |s: Stage| {
            created.get(s).ok_or_else(|| {
                CampaignError::Internal(anyhow::anyhow!("{s} id missing before dependent stage"))
            })
        };

        match stage {
            Stage::Campaign => {
                self.platform
                    .create_campaign(credential, account_id, &prepared.campaign)
                    .await
            }
            Stage::AdSet => {
                self.platform
                    .create_ad_set(
                        credential,
                        account_id,
                        parent(Stage::Campaign)?,
                        prepared.campaign.objective,
                        &prepared.ad_set,
                    )
                    .await
            }
            Stage::Creative if prepared.creative.is_placement_customized() => {
                self.platform
                    .create_placement_creative(credential, account_id, &prepared.creative)
                    .await
            }
            Stage::Creative => {
                self.platform
                    .create_creative(credential, account_id, &prepared.creative)
                    .await
            }
            Stage::Ad => {
                self.platform
                    .create_ad(
                        credential,
                        account_id,
                        parent(Stage::AdSet)?,
                        parent(Stage::Creative)?,
                        &prepared.ad,
                    )
                    .await
            }
        }
    }
}

fn fail(run_id: Uuid, stage: Stage, created: CreatedIds, error: CampaignError) -> PipelineOutcome {
    metrics::counter!("pipeline.failed", "stage" => stage.as_str()).increment(1);
    PipelineOutcome::FailedPartial(PartialFailure {
        run_id,
        failed_stage: stage,
        created,
        error,
    })
}
