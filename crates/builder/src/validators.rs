//! Compatibility rules checked before anything is sent to the platform.
//!
//! Every validator is a pure function returning the derived value on success
//! or a [`ValidationError`] with a message fit for the operator. Expected bad
//! input never panics.

use campaign_core::creative::{AssetFeedSpec, OptimizationType};
use campaign_core::targeting::PlacementSpec;
use campaign_core::types::{BudgetType, GenderSelector, Objective, OptimizationGoal};
use campaign_core::ValidationError;
use serde_json::Value;
use std::collections::BTreeSet;

pub type Validation<T> = Result<T, ValidationError>;

pub const MIN_CUSTOMIZATION_RULES: usize = 2;
pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 65;

fn invalid<T>(message: impl Into<String>) -> Validation<T> {
    Err(ValidationError::new(message))
}

// ─── Objective / optimization goal ──────────────────────────────────────────

/// Allowed goals for an objective name; empty for unknown objectives.
pub fn allowed_optimization_goals(objective: &str) -> &'static [OptimizationGoal] {
    objective
        .parse::<Objective>()
        .map(|o| o.allowed_optimization_goals())
        .unwrap_or(&[])
}

pub fn validate_objective_optimization_goal(
    objective: &str,
    optimization_goal: &str,
) -> Validation<&'static [OptimizationGoal]> {
    if objective.trim().is_empty() || optimization_goal.trim().is_empty() {
        return invalid("Objective and optimization goal are required");
    }

    let Ok(parsed) = objective.parse::<Objective>() else {
        return invalid(format!("Unknown objective: {objective}"));
    };
    let allowed = parsed.allowed_optimization_goals();

    let permitted = optimization_goal
        .parse::<OptimizationGoal>()
        .map(|goal| allowed.contains(&goal))
        .unwrap_or(false);
    if !permitted {
        let names: Vec<&str> = allowed.iter().map(|g| g.as_str()).collect();
        return invalid(format!(
            "Optimization goal \"{optimization_goal}\" is not allowed for objective \"{objective}\". Allowed goals: {}",
            names.join(", ")
        ));
    }

    Ok(allowed)
}

// ─── Budget ─────────────────────────────────────────────────────────────────

/// Exactly one of the two must be a positive number.
pub fn validate_budget_type(daily: Option<f64>, lifetime: Option<f64>) -> Validation<BudgetType> {
    let has_daily = daily.is_some_and(|v| v > 0.0);
    let has_lifetime = lifetime.is_some_and(|v| v > 0.0);

    match (has_daily, has_lifetime) {
        (true, true) => invalid(
            "Cannot specify both daily_budget and lifetime_budget. Please choose one.",
        ),
        (false, false) => invalid("Either daily_budget or lifetime_budget must be specified"),
        (true, false) => Ok(BudgetType::Daily),
        (false, true) => Ok(BudgetType::Lifetime),
    }
}

// ─── Creative type ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeKind {
    Standard,
    PlacementCustomization,
}

fn non_empty_object(value: Option<&Value>) -> Option<&serde_json::Map<String, Value>> {
    value.and_then(Value::as_object).filter(|m| !m.is_empty())
}

/// Classify a raw creative payload. A placement-customized creative must
/// carry a story spec holding the page id and nothing else.
pub fn validate_creative_type(
    object_story_spec: Option<&Value>,
    asset_feed_spec: Option<&Value>,
) -> Validation<CreativeKind> {
    let story = non_empty_object(object_story_spec);
    let has_feed = non_empty_object(asset_feed_spec).is_some();

    if !has_feed {
        return match story {
            Some(_) => Ok(CreativeKind::Standard),
            None => invalid(
                "Either object_story_spec (standard) or asset_feed_spec (placement customization) must be provided",
            ),
        };
    }

    let page_id = story
        .and_then(|s| s.get("page_id"))
        .filter(|v| match v {
            Value::String(s) => !s.trim().is_empty(),
            Value::Number(_) => true,
            _ => false,
        });
    let Some(story) = story.filter(|_| page_id.is_some()) else {
        return invalid(
            "Placement customization (asset_feed_spec) requires object_story_spec with at least page_id",
        );
    };
    if story.len() > 1 {
        let extra: Vec<&str> = story
            .keys()
            .map(String::as_str)
            .filter(|k| *k != "page_id")
            .collect();
        return invalid(format!(
            "When using asset_feed_spec, object_story_spec should only contain page_id (found: {})",
            extra.join(", ")
        ));
    }

    Ok(CreativeKind::PlacementCustomization)
}

// ─── Asset feed ─────────────────────────────────────────────────────────────

/// A structurally valid feed plus the label sets the check computed.
#[derive(Debug, Clone)]
pub struct ValidatedAssetFeed {
    pub spec: AssetFeedSpec,
    pub asset_labels: Vec<String>,
    pub rule_labels: Vec<String>,
}

/// Check a raw `asset_feed_spec` payload: at least two rules, the placement
/// optimization marker, and every rule label declared on some asset. All
/// missing labels are reported together.
pub fn validate_asset_feed_spec(asset_feed_spec: &Value) -> Validation<ValidatedAssetFeed> {
    let Some(feed) = asset_feed_spec.as_object() else {
        return invalid("asset_feed_spec must be an object");
    };

    let Some(rules) = feed.get("asset_customization_rules").and_then(Value::as_array) else {
        return invalid("asset_feed_spec must have asset_customization_rules array");
    };

    if rules.len() < MIN_CUSTOMIZATION_RULES {
        return invalid(format!(
            "asset_feed_spec must have at least {MIN_CUSTOMIZATION_RULES} asset_customization_rules (minimum 2 rules), got {}",
            rules.len()
        ));
    }

    if feed.get("optimization_type").and_then(Value::as_str) != Some(OptimizationType::PLACEMENT) {
        return invalid(format!(
            "asset_feed_spec must have optimization_type: \"{}\"",
            OptimizationType::PLACEMENT
        ));
    }

    let spec: AssetFeedSpec = serde_json::from_value(asset_feed_spec.clone())
        .map_err(|e| ValidationError::new(format!("asset_feed_spec is malformed: {e}")))?;

    check_label_coverage(spec)
}

/// Label coverage over an already-typed feed.
pub fn check_label_coverage(spec: AssetFeedSpec) -> Validation<ValidatedAssetFeed> {
    let missing: BTreeSet<String> = spec.missing_labels().into_iter().map(|m| m.label).collect();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(String::as_str).collect();
        return invalid(format!(
            "Asset labels referenced in rules but not found in assets: {}",
            names.join(", ")
        ));
    }

    let asset_labels = spec.declared_labels().into_iter().map(str::to_string).collect();
    let rule_labels: BTreeSet<String> = spec
        .asset_customization_rules
        .iter()
        .flat_map(|r| r.referenced_labels())
        .map(|(_, label)| label.to_string())
        .collect();

    Ok(ValidatedAssetFeed {
        spec,
        asset_labels,
        rule_labels: rule_labels.into_iter().collect(),
    })
}

// ─── Placements ─────────────────────────────────────────────────────────────

/// Platform-specific placement exceptions. Add new cases here as the
/// platform introduces them.
pub fn validate_placement_combinations(placement: &PlacementSpec) -> Validation<()> {
    let wants_threads =
        placement.has_platform("threads") || !placement.threads_positions.is_empty();
    if wants_threads {
        let instagram_stream = placement.has_platform("instagram")
            && placement.instagram_positions.iter().any(|p| p == "stream");
        if !instagram_stream {
            return invalid("Threads placement requires instagram platform with stream position");
        }
    }
    Ok(())
}

/// Placement rules that depend on the creative's ad format.
pub fn validate_placement_format(placement: &PlacementSpec, ad_format: &str) -> Validation<()> {
    if placement.instagram_positions.iter().any(|p| p == "explore_home")
        && ad_format != "SINGLE_IMAGE"
    {
        return invalid("Instagram explore_home placement only supports SINGLE_IMAGE format");
    }
    validate_placement_combinations(placement)
}

// ─── Targeting ──────────────────────────────────────────────────────────────

pub fn validate_age_range(age_min: Option<u8>, age_max: Option<u8>) -> Validation<()> {
    for (field, age) in [("age_min", age_min), ("age_max", age_max)] {
        if let Some(age) = age {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return invalid(format!(
                    "{field} must be between {MIN_AGE} and {MAX_AGE}, got {age}"
                ));
            }
        }
    }
    if let (Some(min), Some(max)) = (age_min, age_max) {
        if min > max {
            return invalid(format!("age_min ({min}) cannot be greater than age_max ({max})"));
        }
    }
    Ok(())
}

/// Explicit gender codes must name the platform's male (1) or female (2)
/// audiences. An empty list means all genders.
pub fn validate_gender_codes(codes: &[u8]) -> Validation<()> {
    if codes.is_empty() || GenderSelector::from_codes(codes).is_some() {
        return Ok(());
    }
    invalid(format!(
        "genders may only contain 1 (male) and 2 (female), got {codes:?}"
    ))
}

/// A country may not be both included and excluded.
pub fn validate_country_overlap(countries: &[String], excluded: &[String]) -> Validation<()> {
    let included: BTreeSet<&str> = countries.iter().map(String::as_str).collect();
    let overlap: BTreeSet<&str> = excluded
        .iter()
        .map(String::as_str)
        .filter(|c| included.contains(c))
        .collect();
    if overlap.is_empty() {
        return Ok(());
    }
    let codes: Vec<&str> = overlap.into_iter().collect();
    invalid(format!(
        "Countries cannot be both included and excluded: {}",
        codes.join(", ")
    ))
}

// ─── Pixel ──────────────────────────────────────────────────────────────────

pub fn validate_pixel_permissions(
    pixel_id: &str,
    ad_account_id: &str,
    pixel_owner_business_id: Option<&str>,
    ad_account_business_id: Option<&str>,
) -> Validation<()> {
    if pixel_id.trim().is_empty() || ad_account_id.trim().is_empty() {
        return invalid("Pixel ID and Ad Account ID are required");
    }
    if let (Some(owner), Some(account)) = (pixel_owner_business_id, ad_account_business_id) {
        if owner != account {
            return invalid(format!(
                "Pixel owner business ({owner}) does not match ad account business ({account})"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed_with_rules(rules: Value) -> Value {
        json!({
            "ad_formats": ["SINGLE_IMAGE"],
            "optimization_type": "PLACEMENT",
            "images": [
                {"hash": "aaa", "adlabels": [{"name": "feed_img"}]},
                {"hash": "bbb", "adlabels": [{"name": "story_img"}]}
            ],
            "bodies": [{"text": "Buy now", "adlabels": [{"name": "body_a"}]}],
            "asset_customization_rules": rules
        })
    }

    #[test]
    fn test_goal_allowed_for_objective() {
        let allowed = validate_objective_optimization_goal("OUTCOME_SALES", "OFFSITE_CONVERSIONS")
            .unwrap();
        assert!(allowed.contains(&OptimizationGoal::Value));
    }

    #[test]
    fn test_goal_rejected_lists_allowed_set() {
        let err = validate_objective_optimization_goal("OUTCOME_TRAFFIC", "THRUPLAY").unwrap_err();
        assert!(err.message().contains("\"THRUPLAY\" is not allowed"));
        assert!(err
            .message()
            .contains("Allowed goals: LINK_CLICKS, LANDING_PAGE_VIEWS, REACH, IMPRESSIONS"));
    }

    #[test]
    fn test_unknown_objective_rejected() {
        let err = validate_objective_optimization_goal("OUTCOME_FAME", "REACH").unwrap_err();
        assert_eq!(err.message(), "Unknown objective: OUTCOME_FAME");
        assert!(allowed_optimization_goals("OUTCOME_FAME").is_empty());
    }

    #[test]
    fn test_missing_goal_rejected() {
        let err = validate_objective_optimization_goal("OUTCOME_SALES", "").unwrap_err();
        assert_eq!(err.message(), "Objective and optimization goal are required");
    }

    #[test]
    fn test_budget_type_exclusivity() {
        assert_eq!(validate_budget_type(Some(2000.0), None), Ok(BudgetType::Daily));
        assert_eq!(validate_budget_type(None, Some(5.0)), Ok(BudgetType::Lifetime));
        assert_eq!(validate_budget_type(Some(0.0), Some(5.0)), Ok(BudgetType::Lifetime));
        assert!(validate_budget_type(Some(1.0), Some(1.0)).is_err());
        assert!(validate_budget_type(None, None).is_err());
        assert!(validate_budget_type(Some(-3.0), None).is_err());
    }

    #[test]
    fn test_creative_type_standard() {
        let story = json!({"page_id": "1", "link_data": {"link": "https://example.com"}});
        assert_eq!(validate_creative_type(Some(&story), None), Ok(CreativeKind::Standard));
    }

    #[test]
    fn test_creative_type_placement_requires_minimal_story() {
        let feed = feed_with_rules(json!([]));
        let minimal = json!({"page_id": "1"});
        assert_eq!(
            validate_creative_type(Some(&minimal), Some(&feed)),
            Ok(CreativeKind::PlacementCustomization)
        );

        let extra = json!({"page_id": "1", "instagram_actor_id": "2"});
        let err = validate_creative_type(Some(&extra), Some(&feed)).unwrap_err();
        assert!(err.message().contains("should only contain page_id"));
        assert!(err.message().contains("instagram_actor_id"));

        let err = validate_creative_type(None, Some(&feed)).unwrap_err();
        assert!(err.message().contains("requires object_story_spec"));
    }

    #[test]
    fn test_creative_type_neither() {
        assert!(validate_creative_type(Some(&json!({})), None).is_err());
        assert!(validate_creative_type(None, None).is_err());
    }

    #[test]
    fn test_asset_feed_requires_two_rules() {
        let feed = feed_with_rules(json!([
            {"customization_spec": {"publisher_platforms": ["facebook"]}, "image_label": {"name": "feed_img"}}
        ]));
        let err = validate_asset_feed_spec(&feed).unwrap_err();
        assert!(err.message().contains("minimum 2 rules"));
    }

    #[test]
    fn test_asset_feed_requires_placement_optimization() {
        let mut feed = feed_with_rules(json!([{}, {}]));
        feed["optimization_type"] = json!("REGULAR");
        let err = validate_asset_feed_spec(&feed).unwrap_err();
        assert!(err.message().contains("optimization_type"));
    }

    #[test]
    fn test_asset_feed_reports_every_missing_label() {
        let feed = feed_with_rules(json!([
            {"customization_spec": {"publisher_platforms": ["facebook"]}, "image_label": {"name": "ghost_a"}},
            {"customization_spec": {"publisher_platforms": ["instagram"]}, "image_label": {"name": "story_img"}, "body_label": {"name": "ghost_b"}}
        ]));
        let err = validate_asset_feed_spec(&feed).unwrap_err();
        assert_eq!(
            err.message(),
            "Asset labels referenced in rules but not found in assets: ghost_a, ghost_b"
        );
    }

    #[test]
    fn test_asset_feed_valid_returns_label_sets() {
        let feed = feed_with_rules(json!([
            {"customization_spec": {"publisher_platforms": ["facebook"]}, "image_label": {"name": "feed_img"}, "body_label": {"name": "body_a"}},
            {"customization_spec": {"publisher_platforms": ["instagram"], "instagram_positions": ["story"]}, "image_label": {"name": "story_img"}}
        ]));
        let validated = validate_asset_feed_spec(&feed).unwrap();
        assert_eq!(validated.asset_labels, vec!["body_a", "feed_img", "story_img"]);
        assert_eq!(validated.rule_labels, vec!["body_a", "feed_img", "story_img"]);
        assert_eq!(validated.spec.asset_customization_rules.len(), 2);
    }

    #[test]
    fn test_threads_requires_instagram_stream() {
        let threads_only = PlacementSpec {
            publisher_platforms: vec!["facebook".to_string(), "threads".to_string()],
            ..Default::default()
        };
        assert!(validate_placement_combinations(&threads_only).is_err());

        let with_stream = PlacementSpec {
            publisher_platforms: vec!["instagram".to_string(), "threads".to_string()],
            instagram_positions: vec!["stream".to_string()],
            ..Default::default()
        };
        assert!(validate_placement_combinations(&with_stream).is_ok());
    }

    #[test]
    fn test_explore_home_single_image_only() {
        let explore = PlacementSpec {
            publisher_platforms: vec!["instagram".to_string()],
            instagram_positions: vec!["explore_home".to_string()],
            ..Default::default()
        };
        assert!(validate_placement_format(&explore, "SINGLE_IMAGE").is_ok());
        assert!(validate_placement_format(&explore, "SINGLE_VIDEO").is_err());
    }

    #[test]
    fn test_age_range_bounds() {
        assert!(validate_age_range(Some(18), Some(65)).is_ok());
        assert!(validate_age_range(None, None).is_ok());
        assert!(validate_age_range(Some(17), None).is_err());
        assert!(validate_age_range(None, Some(66)).is_err());
        assert!(validate_age_range(Some(40), Some(30)).is_err());
    }

    #[test]
    fn test_gender_codes() {
        assert!(validate_gender_codes(&[]).is_ok());
        assert!(validate_gender_codes(&[1, 2]).is_ok());
        assert!(validate_gender_codes(&[2]).is_ok());
        assert!(validate_gender_codes(&[0]).is_err());
        assert!(validate_gender_codes(&[2, 3]).is_err());
    }

    #[test]
    fn test_country_overlap_named() {
        let err = validate_country_overlap(
            &["US".to_string(), "CA".to_string()],
            &["US".to_string()],
        )
        .unwrap_err();
        assert_eq!(err.message(), "Countries cannot be both included and excluded: US");
        assert!(validate_country_overlap(&["US".to_string()], &["MX".to_string()]).is_ok());
    }

    #[test]
    fn test_pixel_business_mismatch() {
        assert!(validate_pixel_permissions("px", "act_1", Some("b1"), Some("b1")).is_ok());
        assert!(validate_pixel_permissions("px", "act_1", None, Some("b1")).is_ok());
        assert!(validate_pixel_permissions("px", "act_1", Some("b1"), Some("b2")).is_err());
        assert!(validate_pixel_permissions("", "act_1", None, None).is_err());
    }
}
