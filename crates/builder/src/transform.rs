//! Field transformers: UI values into the exact wire values the platform
//! accepts, and typed specs into flat form payloads.

use campaign_core::creative::MinimalStorySpec;
use campaign_core::spec::{AdSetSpec, AdSpec, CampaignSpec, CreativeBody, CreativeSpec};
use campaign_core::targeting::{CountryEntry, GeoLocations, Targeting, TargetingInput};
use campaign_core::types::{Budget, CurrencyUnit, MinorUnits};
use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Timestamp layout the platform accepts for ad-set schedules.
pub const ACCOUNT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Value of `end_time` for an ongoing daily-budget ad set.
pub const ONGOING_END_TIME: &str = "0";

const NAIVE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

// ─── Form payload ───────────────────────────────────────────────────────────

/// Flat, ordered field list, sent as the text parts of a multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    /// Null values are dropped. Strings pass through verbatim; objects and
    /// arrays are JSON-stringified.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .filter_map(|(key, value)| form_value(value).map(|v| (key, v)))
            .collect();
        Self { fields }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn form_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

fn object_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ─── Amounts ────────────────────────────────────────────────────────────────

/// An amount as typed into the form: number or numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> CampaignResult<f64> {
        match self {
            AmountInput::Number(n) => Ok(*n),
            AmountInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| CampaignError::validation(format!("Invalid amount: {s}"))),
        }
    }
}

/// Convert a budget or bid amount into minor units.
///
/// `Minor` amounts must already be whole and pass through untouched.
/// `Major` amounts are scaled by 100 and rounded to the nearest unit.
pub fn convert_budget_to_cents(amount: f64, unit: CurrencyUnit) -> CampaignResult<MinorUnits> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CampaignError::validation(format!(
            "Budget must be a non-negative number, got {amount}"
        )));
    }
    let minor = match unit {
        CurrencyUnit::Minor => {
            if amount.fract() != 0.0 {
                return Err(CampaignError::validation(format!(
                    "Amounts in minor currency units must be whole numbers, got {amount}"
                )));
            }
            amount
        }
        CurrencyUnit::Major => (amount * 100.0).round(),
    };
    if minor > u64::MAX as f64 {
        return Err(CampaignError::validation(format!("Budget is too large: {amount}")));
    }
    Ok(MinorUnits(minor as u64))
}

// ─── Time ───────────────────────────────────────────────────────────────────

/// Render an instant in the advertiser account's zone with its offset.
pub fn format_account_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format(ACCOUNT_TIME_FORMAT)
        .to_string()
}

/// Parse a schedule timestamp. Offset-qualified values are taken as given;
/// naive values are wall-clock time in the account zone.
pub fn parse_schedule_time(raw: &str, timezone: Tz) -> CampaignResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_str(raw, ACCOUNT_TIME_FORMAT) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = NAIVE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| CampaignError::validation(format!("Invalid date/time: {raw}")))?;

    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(CampaignError::validation(format!(
            "{raw} does not exist in timezone {} (daylight saving gap)",
            timezone.name()
        ))),
    }
}

pub fn parse_timezone(name: &str) -> CampaignResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CampaignError::validation(format!("Unknown timezone: {name}")))
}

// ─── Targeting ──────────────────────────────────────────────────────────────

/// UI targeting into wire targeting. The gender selector becomes numeric
/// codes, country pickers become bare ISO codes, and both the include and
/// exclude country lists are kept.
pub fn transform_targeting(input: TargetingInput) -> Targeting {
    let genders = match (input.genders, input.gender) {
        (Some(codes), _) if !codes.is_empty() => codes,
        (_, Some(selector)) => selector.codes(),
        _ => Vec::new(),
    };

    let country_codes = |entries: Vec<CountryEntry>| -> Vec<String> {
        entries
            .iter()
            .map(|c| c.code().trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    };

    Targeting {
        geo_locations: GeoLocations {
            countries: country_codes(input.geo_locations.countries),
            excluded_countries: country_codes(input.geo_locations.excluded_countries),
            extra: input.geo_locations.extra,
        },
        age_min: input.age_min,
        age_max: input.age_max,
        genders,
        locales: input.locales,
        placements: input.placements,
        extra: input.extra,
    }
}

// ─── Resource forms ─────────────────────────────────────────────────────────

pub fn campaign_form(spec: &CampaignSpec) -> FormPayload {
    let mut map = object_map(json!({
        "name": spec.name,
        "objective": spec.objective.as_str(),
        "status": spec.status.as_str(),
        "special_ad_categories": spec.special_ad_categories,
        "bid_strategy": spec.bid_strategy,
    }));
    if let Some(budget) = spec.budget {
        map.insert(budget.field_name().to_string(), json!(budget.amount().get()));
    }
    FormPayload::from_map(map)
}

pub fn ad_set_form(spec: &AdSetSpec, campaign_id: &str) -> CampaignResult<FormPayload> {
    let tz = spec.schedule.timezone;
    let end_time = match (spec.schedule.end, spec.budget) {
        (Some(end), _) => json!(format_account_time(end, tz)),
        (None, Budget::Daily(_)) => json!(ONGOING_END_TIME),
        (None, Budget::Lifetime(_)) => {
            return Err(CampaignError::validation(
                "end_time is required when using lifetime_budget",
            ))
        }
    };

    let mut map = object_map(json!({
        "name": spec.name,
        "campaign_id": campaign_id,
        "status": spec.status.as_str(),
        "targeting": serde_json::to_value(&spec.targeting)?,
        "start_time": format_account_time(spec.schedule.start, tz),
        "end_time": end_time,
        "optimization_goal": spec.optimization_goal.as_str(),
        "billing_event": spec.billing_event,
        "bid_strategy": spec.bid_strategy,
        "bid_amount": spec.bid_amount.map(|b| b.get()),
        "promoted_object": spec.promoted_object,
    }));
    map.insert(
        spec.budget.field_name().to_string(),
        json!(spec.budget.amount().get()),
    );
    Ok(FormPayload::from_map(map))
}

pub fn creative_form(spec: &CreativeSpec) -> CampaignResult<FormPayload> {
    let map = match &spec.body {
        CreativeBody::Standard(story) => object_map(json!({
            "name": spec.name,
            "object_story_spec": serde_json::to_value(story)?,
        })),
        CreativeBody::PlacementCustomized {
            page_id,
            asset_feed_spec,
        } => object_map(json!({
            "name": spec.name,
            "object_story_spec": serde_json::to_value(MinimalStorySpec {
                page_id: page_id.clone(),
            })?,
            "asset_feed_spec": serde_json::to_value(asset_feed_spec)?,
        })),
    };
    Ok(FormPayload::from_map(map))
}

pub fn ad_form(spec: &AdSpec, adset_id: &str, creative_id: &str) -> FormPayload {
    FormPayload::from_map(object_map(json!({
        "name": spec.name,
        "adset_id": adset_id,
        "creative": {"creative_id": creative_id},
        "status": spec.status.as_str(),
    })))
}
