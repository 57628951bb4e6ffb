//! Request bodies as the campaign builder UI submits them, and their
//! conversion into validated specs.

use campaign_core::creative::ObjectStorySpec;
use campaign_core::spec::{
    AdSetSpec, AdSpec, CampaignSpec, CreativeBody, CreativeSpec, PromotedObject, Schedule,
    SPECIAL_AD_CATEGORY_NONE,
};
use campaign_core::targeting::TargetingInput;
use campaign_core::types::{
    Budget, BudgetType, CurrencyUnit, MinorUnits, Objective, OptimizationGoal, ResourceStatus,
};
use campaign_core::{CampaignError, CampaignResult};
use chrono::Utc;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::asset_feed::{build_asset_feed_spec, AssetFeedInput};
use crate::transform::{
    convert_budget_to_cents, parse_schedule_time, transform_targeting, AmountInput,
};
use crate::validators::{
    validate_age_range, validate_asset_feed_spec, validate_budget_type,
    validate_country_overlap, validate_creative_type, validate_gender_codes,
    validate_objective_optimization_goal,
    validate_placement_combinations, validate_placement_format, CreativeKind,
};

pub const DEFAULT_BILLING_EVENT: &str = "IMPRESSIONS";

/// Bid strategies under which the platform requires `bid_amount`.
const BID_AMOUNT_STRATEGIES: [&str; 2] = ["LOWEST_COST_WITH_BID_CAP", "COST_CAP"];

/// A request body addressed to one ad account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountScoped<T> {
    #[serde(alias = "adAccountId")]
    pub ad_account_id: String,
    #[serde(flatten)]
    pub body: T,
}

fn required_name(name: String, what: &str) -> CampaignResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CampaignError::validation(format!("{what} name is required")));
    }
    Ok(trimmed.to_string())
}

fn amount(value: Option<&AmountInput>) -> CampaignResult<Option<f64>> {
    value.map(AmountInput::value).transpose()
}

/// Resolve the budget pair to the single budget it names.
fn resolve_budget(
    daily: Option<&AmountInput>,
    lifetime: Option<&AmountInput>,
    unit: CurrencyUnit,
) -> CampaignResult<Budget> {
    let daily = amount(daily)?;
    let lifetime = amount(lifetime)?;
    let budget = match validate_budget_type(daily, lifetime)? {
        BudgetType::Daily => Budget::Daily(positive_minor(daily.unwrap_or_default(), unit, "daily_budget")?),
        BudgetType::Lifetime => {
            Budget::Lifetime(positive_minor(lifetime.unwrap_or_default(), unit, "lifetime_budget")?)
        }
    };
    Ok(budget)
}

/// Convert to minor units, rejecting amounts that round down to nothing.
fn positive_minor(amount: f64, unit: CurrencyUnit, field: &str) -> CampaignResult<MinorUnits> {
    let minor = convert_budget_to_cents(amount, unit)?;
    if minor.get() == 0 {
        return Err(CampaignError::validation(format!(
            "{field} must be at least one minor currency unit, got {amount}"
        )));
    }
    Ok(minor)
}

// ─── Campaign ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub special_ad_categories: Vec<String>,
    #[serde(default)]
    pub bid_strategy: Option<String>,
    #[serde(default)]
    pub daily_budget: Option<AmountInput>,
    #[serde(default)]
    pub lifetime_budget: Option<AmountInput>,
    #[serde(default)]
    pub budget_unit: CurrencyUnit,
}

impl CampaignRequest {
    /// The objective this request names, parsed.
    pub fn objective(&self) -> CampaignResult<Objective> {
        if self.objective.trim().is_empty() {
            return Err(CampaignError::validation("Campaign objective is required"));
        }
        self.objective
            .trim()
            .parse::<Objective>()
            .map_err(CampaignError::validation)
    }

    pub fn into_spec(self) -> CampaignResult<CampaignSpec> {
        let objective = self.objective()?;
        let name = required_name(self.name, "Campaign")?;

        // Campaign budget optimization is optional; ad-set budgets apply otherwise.
        let budget = if self.daily_budget.is_some() || self.lifetime_budget.is_some() {
            Some(resolve_budget(
                self.daily_budget.as_ref(),
                self.lifetime_budget.as_ref(),
                self.budget_unit,
            )?)
        } else {
            None
        };

        let mut special_ad_categories: Vec<String> = self
            .special_ad_categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if special_ad_categories.is_empty() {
            special_ad_categories.push(SPECIAL_AD_CATEGORY_NONE.to_string());
        }

        Ok(CampaignSpec {
            name,
            objective,
            status: self.status.unwrap_or_default(),
            special_ad_categories,
            bid_strategy: self.bid_strategy.filter(|s| !s.trim().is_empty()),
            budget,
        })
    }
}

// ─── Ad set ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdSetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    /// Parent campaign, for standalone ad-set creation.
    #[serde(default)]
    pub campaign_id: Option<String>,
    /// Parent campaign objective, for standalone ad-set creation.
    #[serde(default)]
    pub campaign_objective: Option<String>,
    #[serde(default)]
    pub daily_budget: Option<AmountInput>,
    #[serde(default)]
    pub lifetime_budget: Option<AmountInput>,
    #[serde(default)]
    pub budget_unit: CurrencyUnit,
    #[serde(default)]
    pub targeting: Option<TargetingInput>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// IANA zone overriding the synced account zone.
    #[serde(default, alias = "timezone_id")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub optimization_goal: Option<String>,
    #[serde(default)]
    pub billing_event: Option<String>,
    #[serde(default)]
    pub bid_strategy: Option<String>,
    #[serde(default)]
    pub bid_amount: Option<AmountInput>,
    #[serde(default)]
    pub promoted_object: Option<PromotedObject>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AdSetRequest {
    /// Validate against the parent campaign's objective and convert all
    /// times into `timezone`.
    pub fn into_spec(self, objective: Objective, timezone: Tz) -> CampaignResult<AdSetSpec> {
        let name = required_name(self.name, "Ad set")?;
        let budget = resolve_budget(
            self.daily_budget.as_ref(),
            self.lifetime_budget.as_ref(),
            self.budget_unit,
        )?;

        let optimization_goal = match non_blank(self.optimization_goal) {
            Some(goal) => {
                validate_objective_optimization_goal(objective.as_str(), &goal)?;
                goal.parse::<OptimizationGoal>()
                    .map_err(CampaignError::validation)?
            }
            None => objective.default_optimization_goal(),
        };

        let targeting_input = self
            .targeting
            .ok_or_else(|| CampaignError::validation("Ad set targeting is required"))?;
        validate_age_range(targeting_input.age_min, targeting_input.age_max)?;
        if let Some(codes) = targeting_input.genders.as_deref() {
            validate_gender_codes(codes)?;
        }
        let targeting = transform_targeting(targeting_input);
        if targeting.geo_locations.countries.is_empty() && targeting.geo_locations.extra.is_empty()
        {
            return Err(CampaignError::validation(
                "Targeting must include at least one location",
            ));
        }
        validate_country_overlap(
            &targeting.geo_locations.countries,
            &targeting.geo_locations.excluded_countries,
        )?;
        validate_placement_combinations(&targeting.placements)?;

        let start = match non_blank(self.start_time) {
            Some(raw) => parse_schedule_time(&raw, timezone)?,
            None => Utc::now(),
        };
        let end = non_blank(self.end_time)
            .map(|raw| parse_schedule_time(&raw, timezone))
            .transpose()?;
        if let Some(end) = end {
            if end <= start {
                return Err(CampaignError::validation("end_time must be after start_time"));
            }
        }
        if matches!(budget, Budget::Lifetime(_)) && end.is_none() {
            return Err(CampaignError::validation(
                "end_time is required when using lifetime_budget",
            ));
        }

        let bid_strategy = non_blank(self.bid_strategy);
        let bid_amount = amount(self.bid_amount.as_ref())?
            .map(|v| positive_minor(v, self.budget_unit, "bid_amount"))
            .transpose()?;
        if let Some(strategy) = bid_strategy.as_deref() {
            if BID_AMOUNT_STRATEGIES.contains(&strategy) && bid_amount.is_none() {
                return Err(CampaignError::validation(format!(
                    "bid_amount is required when bid_strategy is {strategy}"
                )));
            }
        }

        Ok(AdSetSpec {
            name,
            status: self.status.unwrap_or_default(),
            budget,
            targeting,
            schedule: Schedule {
                start,
                end,
                timezone,
            },
            optimization_goal,
            billing_event: non_blank(self.billing_event)
                .unwrap_or_else(|| DEFAULT_BILLING_EVENT.to_string()),
            bid_strategy,
            bid_amount,
            promoted_object: self.promoted_object,
        })
    }
}

// ─── Creative ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreativeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub object_story_spec: Option<Value>,
    /// Ready-made feed, validated as submitted.
    #[serde(default)]
    pub asset_feed_spec: Option<Value>,
    /// Per-placement selections to build a feed from.
    #[serde(default)]
    pub asset_feed: Option<AssetFeedInput>,
    #[serde(default)]
    pub page_id: Option<String>,
}

fn page_id_of(story: &Value) -> Option<String> {
    match story.get("page_id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl CreativeRequest {
    pub fn into_spec(self) -> CampaignResult<CreativeSpec> {
        let name = required_name(self.name, "Creative")?;

        let (story, feed) = match self.asset_feed {
            Some(_) if self.asset_feed_spec.is_some() => {
                return Err(CampaignError::validation(
                    "Provide either asset_feed or asset_feed_spec, not both",
                ))
            }
            Some(input) => {
                let built = build_asset_feed_spec(input)?;
                let story = match (self.object_story_spec, non_blank(self.page_id)) {
                    (Some(story), _) => Some(story),
                    (None, Some(page_id)) => Some(json!({ "page_id": page_id })),
                    (None, None) => None,
                };
                (story, Some(serde_json::to_value(built)?))
            }
            None => {
                let story = match (self.object_story_spec, non_blank(self.page_id)) {
                    (None, Some(page_id)) if self.asset_feed_spec.is_some() => {
                        Some(json!({ "page_id": page_id }))
                    }
                    (story, _) => story,
                };
                (story, self.asset_feed_spec)
            }
        };

        let body = match validate_creative_type(story.as_ref(), feed.as_ref())? {
            CreativeKind::Standard => {
                let story: ObjectStorySpec = serde_json::from_value(story.unwrap_or_default())
                    .map_err(|e| {
                        CampaignError::validation(format!("object_story_spec is malformed: {e}"))
                    })?;
                if story.page_id.trim().is_empty() {
                    return Err(CampaignError::validation("object_story_spec.page_id is required"));
                }
                match &story.link_data {
                    Some(link_data) if link_data.link.trim().is_empty() => {
                        return Err(CampaignError::validation(
                            "object_story_spec.link_data.link is required",
                        ))
                    }
                    Some(_) => {}
                    None if !story.extra.keys().any(|k| k.ends_with("_data")) => {
                        return Err(CampaignError::validation(
                            "object_story_spec needs link_data or another story type such as video_data",
                        ))
                    }
                    None => {}
                }
                CreativeBody::Standard(story)
            }
            CreativeKind::PlacementCustomization => {
                let page_id = story.as_ref().and_then(page_id_of).ok_or_else(|| {
                    CampaignError::validation("object_story_spec.page_id is required")
                })?;
                let validated = validate_asset_feed_spec(&feed.unwrap_or_default())?;
                for rule in &validated.spec.asset_customization_rules {
                    for format in &validated.spec.ad_formats {
                        validate_placement_format(&rule.customization_spec, format)?;
                    }
                }
                CreativeBody::PlacementCustomized {
                    page_id,
                    asset_feed_spec: validated.spec,
                }
            }
        };

        Ok(CreativeSpec { name, body })
    }
}

// ─── Ad ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    /// Parent ids, for standalone ad creation.
    #[serde(default)]
    pub adset_id: Option<String>,
    #[serde(default)]
    pub creative_id: Option<String>,
}

impl AdRequest {
    pub fn into_spec(self) -> CampaignResult<AdSpec> {
        Ok(AdSpec {
            name: required_name(self.name, "Ad")?,
            status: self.status.unwrap_or_default(),
        })
    }
}

// ─── Full submission ────────────────────────────────────────────────────────

/// All four resources in one submission, created in order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FullCampaignRequest {
    pub campaign: CampaignRequest,
    #[serde(alias = "adSet")]
    pub adset: AdSetRequest,
    pub creative: CreativeRequest,
    pub ad: AdRequest,
}
