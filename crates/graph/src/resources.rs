//! One operation per platform resource. Each takes a validated spec and the
//! caller's credential snapshot, builds the form and issues one request.

use async_trait::async_trait;
use campaign_builder::{ad_form, ad_set_form, campaign_form, creative_form};
use campaign_core::spec::{AdSetSpec, AdSpec, CampaignSpec, CreativeSpec};
use campaign_core::types::Objective;
use campaign_core::{CampaignError, CampaignResult, Credential};
use tracing::debug;

use crate::client::{GraphClient, Resource};
use crate::response::{CreatedResource, UploadedImage};

pub const DEFAULT_IMAGE_FILE_NAME: &str = "image.jpg";

/// Seam between the pipeline and the advertising platform.
#[async_trait]
pub trait AdPlatform: Send + Sync {
    async fn create_campaign(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CampaignSpec,
    ) -> CampaignResult<CreatedResource>;

    /// `objective` is the parent campaign's; the goal was checked against it
    /// when the spec was built and is re-checked here.
    async fn create_ad_set(
        &self,
        credential: &Credential,
        account_id: &str,
        campaign_id: &str,
        objective: Objective,
        spec: &AdSetSpec,
    ) -> CampaignResult<CreatedResource>;

    /// Standard creative with a single object story.
    async fn create_creative(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource>;

    /// Creative carrying a placement-customized asset feed.
    async fn create_placement_creative(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource>;

    async fn create_ad(
        &self,
        credential: &Credential,
        account_id: &str,
        adset_id: &str,
        creative_id: &str,
        spec: &AdSpec,
    ) -> CampaignResult<CreatedResource>;

    async fn upload_image(
        &self,
        credential: &Credential,
        account_id: &str,
        bytes: Vec<u8>,
        file_name: Option<&str>,
    ) -> CampaignResult<UploadedImage>;
}

fn require_parent(id: &str, what: &str) -> CampaignResult<()> {
    if id.trim().is_empty() {
        return Err(CampaignError::validation(format!("{what} is required")));
    }
    Ok(())
}

#[async_trait]
impl AdPlatform for GraphClient {
    async fn create_campaign(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CampaignSpec,
    ) -> CampaignResult<CreatedResource> {
        let form = campaign_form(spec);
        self.post_form(Resource::Campaign, account_id, credential, &form)
            .await
    }

    async fn create_ad_set(
        &self,
        credential: &Credential,
        account_id: &str,
        campaign_id: &str,
        objective: Objective,
        spec: &AdSetSpec,
    ) -> CampaignResult<CreatedResource> {
        require_parent(campaign_id, "campaign_id")?;
        if !objective
            .allowed_optimization_goals()
            .contains(&spec.optimization_goal)
        {
            return Err(CampaignError::validation(format!(
                "Optimization goal \"{}\" is not allowed for objective \"{}\"",
                spec.optimization_goal, objective
            )));
        }
        let form = ad_set_form(spec, campaign_id)?;
        self.post_form(Resource::AdSet, account_id, credential, &form)
            .await
    }

    async fn create_creative(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource> {
        if spec.is_placement_customized() {
            return Err(CampaignError::validation(
                "Creative carries asset_feed_spec; use the placement customization endpoint",
            ));
        }
        let form = creative_form(spec)?;
        self.post_form(Resource::Creative, account_id, credential, &form)
            .await
    }

    async fn create_placement_creative(
        &self,
        credential: &Credential,
        account_id: &str,
        spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource> {
        if !spec.is_placement_customized() {
            return Err(CampaignError::validation(
                "Placement customization requires asset_feed_spec",
            ));
        }
        let form = creative_form(spec)?;
        debug!(creative = %spec.name, "Creating placement-customized creative");
        self.post_form(Resource::Creative, account_id, credential, &form)
            .await
    }

    async fn create_ad(
        &self,
        credential: &Credential,
        account_id: &str,
        adset_id: &str,
        creative_id: &str,
        spec: &AdSpec,
    ) -> CampaignResult<CreatedResource> {
        require_parent(adset_id, "adset_id")?;
        require_parent(creative_id, "creative_id")?;
        let form = ad_form(spec, adset_id, creative_id);
        self.post_form(Resource::Ad, account_id, credential, &form)
            .await
    }

    async fn upload_image(
        &self,
        credential: &Credential,
        account_id: &str,
        bytes: Vec<u8>,
        file_name: Option<&str>,
    ) -> CampaignResult<UploadedImage> {
        if bytes.is_empty() {
            return Err(CampaignError::validation("No image file provided"));
        }
        let file_name = file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_FILE_NAME);
        self.post_image(account_id, credential, bytes, file_name)
            .await
    }
}
