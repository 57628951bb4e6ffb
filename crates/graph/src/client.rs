//! HTTP client for the platform's per-account collection endpoints.
//! One POST per call, credential attached as the `access_token` parameter.

use campaign_builder::FormPayload;
use campaign_core::config::PlatformConfig;
use campaign_core::types::graph_account_id;
use campaign_core::{CampaignError, CampaignResult, Credential};
use chrono::Utc;
use reqwest::{multipart, Client};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::response::{parse_created, parse_uploaded_image, platform_error, CreatedResource, UploadedImage};

/// Resource types the launcher creates, used for routing and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Campaign,
    AdSet,
    Creative,
    Ad,
    Image,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Campaign => "campaign",
            Resource::AdSet => "adset",
            Resource::Creative => "creative",
            Resource::Ad => "ad",
            Resource::Image => "image",
        }
    }

    /// Collection edge under the ad account.
    pub fn edge(&self) -> &'static str {
        match self {
            Resource::Campaign => "campaigns",
            Resource::AdSet => "adsets",
            Resource::Creative => "adcreatives",
            Resource::Ad => "ads",
            Resource::Image => "adimages",
        }
    }
}

pub struct GraphClient {
    http: Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(config: &PlatformConfig) -> CampaignResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| CampaignError::Config(format!("Failed to build HTTP client: {e}")))?;
        let base_url = config.versioned_base_url();

        info!(base_url = %base_url, timeout_ms = config.request_timeout_ms, "Graph API client initialized");

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, account_id: &str, resource: Resource) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            graph_account_id(account_id),
            resource.edge()
        )
    }

    /// POST the form as `multipart/form-data` text parts to the resource's
    /// collection and return the created id.
    pub async fn post_form(
        &self,
        resource: Resource,
        account_id: &str,
        credential: &Credential,
        form: &FormPayload,
    ) -> CampaignResult<CreatedResource> {
        ensure_usable(credential)?;
        let url = self.endpoint(account_id, resource);

        debug!(
            resource = resource.as_str(),
            account_id = %account_id,
            fields = %credential.redact(&format!("{:?}", form.fields())),
            "Submitting form to platform"
        );

        let body = form
            .fields()
            .iter()
            .fold(multipart::Form::new(), |body, (key, value)| {
                body.text(key.clone(), value.clone())
            })
            .text("access_token", credential.token.expose().to_string());

        let started = Instant::now();
        metrics::counter!("graph.requests", "resource" => resource.as_str()).increment(1);
        let response = self.http.post(&url).multipart(body).send().await;
        let raw = self.finish(resource, credential, response, started).await?;
        let created = parse_created(raw)?;

        info!(
            resource = resource.as_str(),
            account_id = %account_id,
            resource_id = %created.id,
            "Platform resource created"
        );
        Ok(created)
    }

    /// Multipart upload of raw image bytes under the `bytes` field.
    pub async fn post_image(
        &self,
        account_id: &str,
        credential: &Credential,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> CampaignResult<UploadedImage> {
        ensure_usable(credential)?;
        let url = self.endpoint(account_id, Resource::Image);
        let size = bytes.len();

        let form = multipart::Form::new()
            .text("access_token", credential.token.expose().to_string())
            .part(
                "bytes",
                multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            );

        debug!(account_id = %account_id, size, file_name, "Uploading image to platform");

        let started = Instant::now();
        metrics::counter!("graph.requests", "resource" => Resource::Image.as_str()).increment(1);
        let response = self.http.post(&url).multipart(form).send().await;
        let raw = self.finish(Resource::Image, credential, response, started).await?;
        let image = parse_uploaded_image(raw)?;

        info!(account_id = %account_id, image_hash = %image.hash, "Image uploaded");
        Ok(image)
    }

    async fn finish(
        &self,
        resource: Resource,
        credential: &Credential,
        response: reqwest::Result<reqwest::Response>,
        started: Instant,
    ) -> CampaignResult<Value> {
        let result = read_response(credential, response).await;
        metrics::histogram!("graph.latency_ms", "resource" => resource.as_str())
            .record(started.elapsed().as_secs_f64() * 1000.0);

        if let Err(err) = &result {
            metrics::counter!("graph.errors", "resource" => resource.as_str()).increment(1);
            match err.platform_body() {
                Some(body) => warn!(
                    resource = resource.as_str(),
                    code = ?body.code,
                    error_subcode = ?body.error_subcode,
                    fbtrace_id = ?body.fbtrace_id,
                    error = %body,
                    "Platform rejected request"
                ),
                None => warn!(resource = resource.as_str(), error = %err, "Platform request failed"),
            }
        }
        result
    }
}

async fn read_response(
    credential: &Credential,
    response: reqwest::Result<reqwest::Response>,
) -> CampaignResult<Value> {
    let response = response.map_err(|e| transport_error(credential, &e))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(credential, &e))?;

    if !status.is_success() {
        return Err(platform_error(status.as_u16(), &text, credential));
    }

    serde_json::from_str(&text).map_err(|e| {
        CampaignError::Transport(format!("Platform returned a non-JSON body: {e}"))
    })
}

fn transport_error(credential: &Credential, err: &reqwest::Error) -> CampaignError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    };
    CampaignError::Transport(credential.redact(&message))
}

fn ensure_usable(credential: &Credential) -> CampaignResult<()> {
    if credential.token.is_empty() {
        return Err(CampaignError::Credential("No access token available".to_string()));
    }
    if credential.is_expired_at(Utc::now()) {
        let at = credential
            .expires_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        return Err(CampaignError::Credential(format!("Access token expired at {at}")));
    }
    Ok(())
}
