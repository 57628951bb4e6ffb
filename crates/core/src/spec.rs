//! Validated, transient request specs for the four resources a submission
//! creates. Built fresh per submission and dropped after the call returns.

use crate::creative::{AssetFeedSpec, ObjectStorySpec};
use crate::targeting::Targeting;
use crate::types::{Budget, MinorUnits, Objective, OptimizationGoal, ResourceStatus};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SPECIAL_AD_CATEGORY_NONE: &str = "NONE";

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSpec {
    pub name: String,
    pub objective: Objective,
    pub status: ResourceStatus,
    /// Never empty: an empty selection is normalized to `["NONE"]`.
    pub special_ad_categories: Vec<String>,
    pub bid_strategy: Option<String>,
    /// Campaign budget optimization; ad-set budgets are used when absent.
    pub budget: Option<Budget>,
}

/// Conversion tracking target of an ad set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromotedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Advertiser account zone the platform expects timestamps in.
    pub timezone: Tz,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdSetSpec {
    pub name: String,
    pub status: ResourceStatus,
    pub budget: Budget,
    pub targeting: Targeting,
    pub schedule: Schedule,
    pub optimization_goal: OptimizationGoal,
    pub billing_event: String,
    pub bid_strategy: Option<String>,
    pub bid_amount: Option<MinorUnits>,
    pub promoted_object: Option<PromotedObject>,
}

/// Creative shape. The two variants are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum CreativeBody {
    Standard(ObjectStorySpec),
    PlacementCustomized {
        page_id: String,
        asset_feed_spec: AssetFeedSpec,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreativeSpec {
    pub name: String,
    pub body: CreativeBody,
}

impl CreativeSpec {
    pub fn is_placement_customized(&self) -> bool {
        matches!(self.body, CreativeBody::PlacementCustomized { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdSpec {
    pub name: String,
    pub status: ResourceStatus,
}
