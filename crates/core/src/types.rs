//! Core campaign vocabulary shared by every layer: objectives, optimization
//! goals, statuses, budgets and the gender selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Objective ──────────────────────────────────────────────────────────────

/// Campaign objective as understood by the advertising platform.
/// Covers both the legacy objectives and the outcome-based (ODAX) set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Objective {
    LinkClicks,
    Conversions,
    LeadGeneration,
    AppInstalls,
    BrandAwareness,
    Reach,
    VideoViews,
    PostEngagement,
    PageLikes,
    EventResponses,
    Messages,
    ProductCatalogSales,
    OutcomeTraffic,
    OutcomeSales,
    OutcomeLeads,
    OutcomeEngagement,
    OutcomeAppPromotion,
    OutcomeAwareness,
}

impl Objective {
    pub const ALL: [Objective; 18] = [
        Objective::LinkClicks,
        Objective::Conversions,
        Objective::LeadGeneration,
        Objective::AppInstalls,
        Objective::BrandAwareness,
        Objective::Reach,
        Objective::VideoViews,
        Objective::PostEngagement,
        Objective::PageLikes,
        Objective::EventResponses,
        Objective::Messages,
        Objective::ProductCatalogSales,
        Objective::OutcomeTraffic,
        Objective::OutcomeSales,
        Objective::OutcomeLeads,
        Objective::OutcomeEngagement,
        Objective::OutcomeAppPromotion,
        Objective::OutcomeAwareness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::LinkClicks => "LINK_CLICKS",
            Objective::Conversions => "CONVERSIONS",
            Objective::LeadGeneration => "LEAD_GENERATION",
            Objective::AppInstalls => "APP_INSTALLS",
            Objective::BrandAwareness => "BRAND_AWARENESS",
            Objective::Reach => "REACH",
            Objective::VideoViews => "VIDEO_VIEWS",
            Objective::PostEngagement => "POST_ENGAGEMENT",
            Objective::PageLikes => "PAGE_LIKES",
            Objective::EventResponses => "EVENT_RESPONSES",
            Objective::Messages => "MESSAGES",
            Objective::ProductCatalogSales => "PRODUCT_CATALOG_SALES",
            Objective::OutcomeTraffic => "OUTCOME_TRAFFIC",
            Objective::OutcomeSales => "OUTCOME_SALES",
            Objective::OutcomeLeads => "OUTCOME_LEADS",
            Objective::OutcomeEngagement => "OUTCOME_ENGAGEMENT",
            Objective::OutcomeAppPromotion => "OUTCOME_APP_PROMOTION",
            Objective::OutcomeAwareness => "OUTCOME_AWARENESS",
        }
    }

    /// Optimization goals the platform accepts beneath this objective.
    pub fn allowed_optimization_goals(&self) -> &'static [OptimizationGoal] {
        use OptimizationGoal::*;
        match self {
            Objective::LinkClicks => &[LinkClicks, LandingPageViews, Impressions, Reach],
            Objective::Conversions | Objective::OutcomeSales => &[
                OffsiteConversions,
                Value,
                LandingPageViews,
                LinkClicks,
                Impressions,
                Reach,
            ],
            Objective::LeadGeneration => &[
                LeadGeneration,
                QualityLead,
                OffsiteConversions,
                LandingPageViews,
                LinkClicks,
                Impressions,
                Reach,
            ],
            Objective::AppInstalls => &[
                AppInstalls,
                AppInstallsAndOffsiteConversions,
                LinkClicks,
                Reach,
            ],
            Objective::BrandAwareness => &[AdRecallLift, Reach, Impressions],
            Objective::Reach => &[Reach, Impressions],
            Objective::VideoViews => &[Thruplay, TwoSecondContinuousVideoViews, Impressions],
            Objective::PostEngagement => &[PostEngagement, Impressions, Reach],
            Objective::PageLikes => &[PageLikes, Impressions, Reach],
            Objective::EventResponses => &[EventResponses, PostEngagement, Impressions, Reach],
            Objective::Messages => &[Conversations, LinkClicks],
            Objective::ProductCatalogSales => &[OffsiteConversions, Value],
            Objective::OutcomeTraffic => &[LinkClicks, LandingPageViews, Reach, Impressions],
            Objective::OutcomeLeads => &[
                OffsiteConversions,
                LeadGeneration,
                QualityLead,
                LandingPageViews,
                LinkClicks,
                Impressions,
                Reach,
            ],
            Objective::OutcomeEngagement => &[
                PostEngagement,
                PageLikes,
                EventResponses,
                Thruplay,
                Conversations,
                LinkClicks,
                Impressions,
                Reach,
            ],
            Objective::OutcomeAppPromotion => &[
                AppInstalls,
                AppInstallsAndOffsiteConversions,
                LinkClicks,
                Value,
            ],
            Objective::OutcomeAwareness => &[
                AdRecallLift,
                Reach,
                Impressions,
                Thruplay,
                TwoSecondContinuousVideoViews,
            ],
        }
    }

    /// Goal used when the operator leaves the ad set's goal unset.
    pub fn default_optimization_goal(&self) -> OptimizationGoal {
        match self {
            Objective::OutcomeSales | Objective::OutcomeLeads => {
                OptimizationGoal::OffsiteConversions
            }
            Objective::OutcomeTraffic => OptimizationGoal::LinkClicks,
            Objective::OutcomeEngagement => OptimizationGoal::PostEngagement,
            Objective::OutcomeAwareness => OptimizationGoal::Reach,
            Objective::OutcomeAppPromotion => OptimizationGoal::AppInstalls,
            legacy => legacy
                .allowed_optimization_goals()
                .first()
                .copied()
                .unwrap_or(OptimizationGoal::LinkClicks),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Objective::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Objective::ALL.iter().map(|o| o.as_str()).collect();
                format!(
                    "Invalid objective: {s}. Must be one of: {}",
                    valid.join(", ")
                )
            })
    }
}

// ─── Optimization goal ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationGoal {
    LinkClicks,
    LandingPageViews,
    Impressions,
    Reach,
    OffsiteConversions,
    Value,
    LeadGeneration,
    QualityLead,
    AppInstalls,
    AppInstallsAndOffsiteConversions,
    AdRecallLift,
    Thruplay,
    TwoSecondContinuousVideoViews,
    PostEngagement,
    PageLikes,
    EventResponses,
    Conversations,
}

impl OptimizationGoal {
    pub const ALL: [OptimizationGoal; 17] = [
        OptimizationGoal::LinkClicks,
        OptimizationGoal::LandingPageViews,
        OptimizationGoal::Impressions,
        OptimizationGoal::Reach,
        OptimizationGoal::OffsiteConversions,
        OptimizationGoal::Value,
        OptimizationGoal::LeadGeneration,
        OptimizationGoal::QualityLead,
        OptimizationGoal::AppInstalls,
        OptimizationGoal::AppInstallsAndOffsiteConversions,
        OptimizationGoal::AdRecallLift,
        OptimizationGoal::Thruplay,
        OptimizationGoal::TwoSecondContinuousVideoViews,
        OptimizationGoal::PostEngagement,
        OptimizationGoal::PageLikes,
        OptimizationGoal::EventResponses,
        OptimizationGoal::Conversations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationGoal::LinkClicks => "LINK_CLICKS",
            OptimizationGoal::LandingPageViews => "LANDING_PAGE_VIEWS",
            OptimizationGoal::Impressions => "IMPRESSIONS",
            OptimizationGoal::Reach => "REACH",
            OptimizationGoal::OffsiteConversions => "OFFSITE_CONVERSIONS",
            OptimizationGoal::Value => "VALUE",
            OptimizationGoal::LeadGeneration => "LEAD_GENERATION",
            OptimizationGoal::QualityLead => "QUALITY_LEAD",
            OptimizationGoal::AppInstalls => "APP_INSTALLS",
            OptimizationGoal::AppInstallsAndOffsiteConversions => {
                "APP_INSTALLS_AND_OFFSITE_CONVERSIONS"
            }
            OptimizationGoal::AdRecallLift => "AD_RECALL_LIFT",
            OptimizationGoal::Thruplay => "THRUPLAY",
            OptimizationGoal::TwoSecondContinuousVideoViews => "TWO_SECOND_CONTINUOUS_VIDEO_VIEWS",
            OptimizationGoal::PostEngagement => "POST_ENGAGEMENT",
            OptimizationGoal::PageLikes => "PAGE_LIKES",
            OptimizationGoal::EventResponses => "EVENT_RESPONSES",
            OptimizationGoal::Conversations => "CONVERSATIONS",
        }
    }
}

impl fmt::Display for OptimizationGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptimizationGoal::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("Unknown optimization goal: {s}"))
    }
}

// ─── Status ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    #[default]
    Paused,
    Active,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Paused => "PAUSED",
            ResourceStatus::Active => "ACTIVE",
        }
    }
}

// ─── Budget ─────────────────────────────────────────────────────────────────

/// An amount in the smallest currency denomination (e.g. cents).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit the caller used when entering an amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyUnit {
    /// Already in minor units (cents); passed through unchanged.
    #[default]
    Minor,
    /// Whole currency units (dollars); scaled by 100 and rounded.
    Major,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Daily,
    Lifetime,
}

/// Exactly one of daily or lifetime budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Daily(MinorUnits),
    Lifetime(MinorUnits),
}

impl Budget {
    pub fn budget_type(&self) -> BudgetType {
        match self {
            Budget::Daily(_) => BudgetType::Daily,
            Budget::Lifetime(_) => BudgetType::Lifetime,
        }
    }

    pub fn amount(&self) -> MinorUnits {
        match self {
            Budget::Daily(amount) | Budget::Lifetime(amount) => *amount,
        }
    }

    /// Wire field carrying this budget.
    pub fn field_name(&self) -> &'static str {
        match self {
            Budget::Daily(_) => "daily_budget",
            Budget::Lifetime(_) => "lifetime_budget",
        }
    }
}

// ─── Gender ─────────────────────────────────────────────────────────────────

/// Operator-facing gender selector; the platform wants numeric codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderSelector {
    #[default]
    All,
    Male,
    Female,
}

impl GenderSelector {
    pub fn codes(&self) -> Vec<u8> {
        match self {
            GenderSelector::All => vec![1, 2],
            GenderSelector::Male => vec![1],
            GenderSelector::Female => vec![2],
        }
    }

    pub fn from_codes(codes: &[u8]) -> Option<Self> {
        let male = codes.contains(&1);
        let female = codes.contains(&2);
        if codes.iter().any(|c| *c != 1 && *c != 2) {
            return None;
        }
        match (male, female) {
            (true, true) => Some(GenderSelector::All),
            (true, false) => Some(GenderSelector::Male),
            (false, true) => Some(GenderSelector::Female),
            (false, false) => None,
        }
    }
}

// ─── Account ids ────────────────────────────────────────────────────────────

/// Strip the `act_` prefix the platform puts on ad-account ids.
pub fn bare_account_id(id: &str) -> &str {
    id.trim().strip_prefix("act_").unwrap_or(id.trim())
}

/// Ad-account id in the `act_<id>` form used in graph paths.
pub fn graph_account_id(id: &str) -> String {
    format!("act_{}", bare_account_id(id))
}
