//! Property-based tests for the campaign builder
//!
//! Tests invariants:
//! - Major-unit amounts land on the exact minor-unit value
//! - Goal validation agrees with each objective's allowed set
//! - Exactly one budget type is ever accepted
//! - Account-zone timestamps parse back to the same instant

use campaign_builder::transform::{convert_budget_to_cents, format_account_time, parse_schedule_time};
use campaign_builder::validators::{
    validate_budget_type, validate_country_overlap, validate_objective_optimization_goal,
};
use campaign_core::types::{BudgetType, CurrencyUnit, MinorUnits, Objective, OptimizationGoal};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_objective() -> impl Strategy<Value = Objective> {
    (0..Objective::ALL.len()).prop_map(|i| Objective::ALL[i])
}

fn arb_goal() -> impl Strategy<Value = OptimizationGoal> {
    (0..OptimizationGoal::ALL.len()).prop_map(|i| OptimizationGoal::ALL[i])
}

fn arb_timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(chrono_tz::America::Los_Angeles),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Asia::Kolkata),
        Just(chrono_tz::Australia::Sydney),
        Just(chrono_tz::UTC),
    ]
}

fn arb_country_set(letters: &'static str) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex(&format!("[{letters}]{{2}}")).unwrap(),
        0..6,
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_major_units_hit_exact_cents(cents in 0u64..100_000_000) {
        let major = cents as f64 / 100.0;
        let converted = convert_budget_to_cents(major, CurrencyUnit::Major).unwrap();
        prop_assert_eq!(converted, MinorUnits(cents));
    }

    #[test]
    fn prop_minor_units_pass_through(cents in 0u64..1_000_000_000) {
        let converted = convert_budget_to_cents(cents as f64, CurrencyUnit::Minor).unwrap();
        prop_assert_eq!(converted, MinorUnits(cents));
    }

    #[test]
    fn prop_goal_validation_matches_table(objective in arb_objective(), goal in arb_goal()) {
        let allowed = objective.allowed_optimization_goals().contains(&goal);
        let result = validate_objective_optimization_goal(objective.as_str(), goal.as_str());
        prop_assert_eq!(result.is_ok(), allowed);
        if let Err(err) = result {
            prop_assert!(err.message().contains(goal.as_str()));
        }
    }

    #[test]
    fn prop_exactly_one_budget(
        daily in prop::option::of(-100.0f64..100_000.0),
        lifetime in prop::option::of(-100.0f64..100_000.0),
    ) {
        let has_daily = daily.is_some_and(|v| v > 0.0);
        let has_lifetime = lifetime.is_some_and(|v| v > 0.0);
        match validate_budget_type(daily, lifetime) {
            Ok(BudgetType::Daily) => prop_assert!(has_daily && !has_lifetime),
            Ok(BudgetType::Lifetime) => prop_assert!(has_lifetime && !has_daily),
            Err(_) => prop_assert_eq!(has_daily, has_lifetime),
        }
    }

    #[test]
    fn prop_account_time_parses_back(secs in 1_600_000_000i64..2_000_000_000, tz in arb_timezone()) {
        let instant = Utc.timestamp_opt(secs, 0).unwrap();
        let rendered = format_account_time(instant, tz);
        prop_assert_eq!(parse_schedule_time(&rendered, tz).unwrap(), instant);
    }

    #[test]
    fn prop_disjoint_countries_never_overlap(
        included in arb_country_set("A-M"),
        excluded in arb_country_set("N-Z"),
    ) {
        prop_assert!(validate_country_overlap(&included, &excluded).is_ok());
    }

    #[test]
    fn prop_shared_country_always_named(code in "[A-Z]{2}", others in arb_country_set("A-Z")) {
        let mut included = others.clone();
        included.push(code.clone());
        let err = validate_country_overlap(&included, &[code.clone()]).unwrap_err();
        prop_assert!(err.message().contains(&code));
    }
}
