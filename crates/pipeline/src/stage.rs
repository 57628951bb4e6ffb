//! Pipeline stages, the created-id accumulator and run outcomes.

use campaign_core::CampaignError;
use campaign_graph::Resource;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// The four ordered creation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Campaign,
    #[serde(rename = "adset")]
    AdSet,
    Creative,
    Ad,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Stage::Campaign, Stage::AdSet, Stage::Creative, Stage::Ad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Campaign => "campaign",
            Stage::AdSet => "adset",
            Stage::Creative => "creative",
            Stage::Ad => "ad",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Stage::Campaign => Resource::Campaign,
            Stage::AdSet => Resource::AdSet,
            Stage::Creative => Resource::Creative,
            Stage::Ad => Resource::Ad,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A created resource tagged with its type, for cleanup tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedResourceRef {
    pub resource_type: Stage,
    pub id: String,
}

/// Ids recorded so far, filled strictly in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreatedIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
}

impl CreatedIds {
    pub fn record(&mut self, stage: Stage, id: impl Into<String>) {
        let slot = match stage {
            Stage::Campaign => &mut self.campaign_id,
            Stage::AdSet => &mut self.adset_id,
            Stage::Creative => &mut self.creative_id,
            Stage::Ad => &mut self.ad_id,
        };
        *slot = Some(id.into());
    }

    pub fn get(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Campaign => self.campaign_id.as_deref(),
            Stage::AdSet => self.adset_id.as_deref(),
            Stage::Creative => self.creative_id.as_deref(),
            Stage::Ad => self.ad_id.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Stage::ORDER.iter().all(|s| self.get(*s).is_none())
    }

    /// Created resources in creation order.
    pub fn resources(&self) -> Vec<CreatedResourceRef> {
        Stage::ORDER
            .iter()
            .filter_map(|stage| {
                self.get(*stage).map(|id| CreatedResourceRef {
                    resource_type: *stage,
                    id: id.to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub created: CreatedIds,
    /// Raw platform response per stage, in order.
    pub responses: Vec<(Stage, Value)>,
}

/// A run that stopped at `failed_stage`. Anything in `created` exists on
/// the platform and was left in place.
#[derive(Debug)]
pub struct PartialFailure {
    pub run_id: Uuid,
    pub failed_stage: Stage,
    pub created: CreatedIds,
    pub error: CampaignError,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Succeeded(PipelineRun),
    FailedPartial(PartialFailure),
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Succeeded(_))
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            PipelineOutcome::Succeeded(run) => run.run_id,
            PipelineOutcome::FailedPartial(failure) => failure.run_id,
        }
    }

    pub fn created(&self) -> &CreatedIds {
        match self {
            PipelineOutcome::Succeeded(run) => &run.created,
            PipelineOutcome::FailedPartial(failure) => &failure.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_follow_stage_order() {
        let mut ids = CreatedIds::default();
        assert!(ids.is_empty());
        ids.record(Stage::AdSet, "s1");
        ids.record(Stage::Campaign, "c1");
        let refs = ids.resources();
        assert_eq!(refs[0], CreatedResourceRef { resource_type: Stage::Campaign, id: "c1".to_string() });
        assert_eq!(refs[1].resource_type, Stage::AdSet);
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_created_ids_omit_missing_stages() {
        let mut ids = CreatedIds::default();
        ids.record(Stage::Campaign, "c1");
        let json = serde_json::to_value(&ids).unwrap();
        assert_eq!(json, serde_json::json!({"campaign_id": "c1"}));
        assert_eq!(serde_json::to_value(Stage::AdSet).unwrap(), "adset");
    }
}
