//! Builds an `asset_feed_spec` for placement asset customization from the
//! creative builder's per-placement selections.

use campaign_core::creative::{
    AdLabel, AssetFeedSpec, CustomizationRule, ImageAsset, LinkUrlAsset, OptimizationType,
    TextAsset, VideoAsset,
};
use campaign_core::targeting::PlacementSpec;
use campaign_core::{CampaignError, CampaignResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::validators::{validate_placement_format, MIN_CUSTOMIZATION_RULES};

pub const DEFAULT_AD_FORMAT: &str = "SINGLE_IMAGE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageInput {
    #[serde(alias = "image_hash")]
    pub hash: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub image_crops: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInput {
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_hash: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextInput {
    pub text: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkUrlInput {
    pub website_url: String,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub deeplink_url: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Where a rule applies and which label of each asset type to show there.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacementRuleInput {
    #[serde(flatten)]
    pub placement: PlacementSpec,
    #[serde(default)]
    pub image_label: Option<String>,
    #[serde(default)]
    pub video_label: Option<String>,
    #[serde(default)]
    pub carousel_label: Option<String>,
    #[serde(default)]
    pub title_label: Option<String>,
    #[serde(default)]
    pub body_label: Option<String>,
    #[serde(default)]
    pub description_label: Option<String>,
    #[serde(default)]
    pub link_url_label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFeedInput {
    #[serde(default, alias = "adFormats")]
    pub ad_formats: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    pub videos: Vec<VideoInput>,
    #[serde(default)]
    pub titles: Vec<TextInput>,
    #[serde(default)]
    pub bodies: Vec<TextInput>,
    #[serde(default)]
    pub descriptions: Vec<TextInput>,
    #[serde(default, alias = "linkUrls")]
    pub link_urls: Vec<LinkUrlInput>,
    #[serde(default, alias = "callToActionTypes")]
    pub call_to_action_types: Vec<String>,
    #[serde(default)]
    pub placements: Vec<PlacementRuleInput>,
}

fn labels(names: Vec<String>) -> Vec<AdLabel> {
    names
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .map(AdLabel::new)
        .collect()
}

fn label(name: Option<String>) -> Option<AdLabel> {
    name.filter(|n| !n.trim().is_empty()).map(AdLabel::new)
}

fn text_assets(inputs: Vec<TextInput>) -> Vec<TextAsset> {
    inputs
        .into_iter()
        .map(|t| TextAsset {
            text: t.text,
            adlabels: labels(t.labels),
        })
        .collect()
}

/// Assemble the feed, check every placement against every ad format, and
/// fail on the first rule label that no asset declares.
pub fn build_asset_feed_spec(input: AssetFeedInput) -> CampaignResult<AssetFeedSpec> {
    if input.placements.len() < MIN_CUSTOMIZATION_RULES {
        return Err(CampaignError::validation(format!(
            "Placement Asset Customization requires at least {MIN_CUSTOMIZATION_RULES} placement rules"
        )));
    }

    let ad_formats = if input.ad_formats.is_empty() {
        vec![DEFAULT_AD_FORMAT.to_string()]
    } else {
        input.ad_formats
    };

    for rule in &input.placements {
        for format in &ad_formats {
            validate_placement_format(&rule.placement, format)?;
        }
    }

    let spec = AssetFeedSpec {
        ad_formats,
        optimization_type: OptimizationType::Placement,
        images: input
            .images
            .into_iter()
            .map(|i| ImageAsset {
                hash: i.hash,
                adlabels: labels(i.labels),
                image_crops: i.image_crops,
            })
            .collect(),
        videos: input
            .videos
            .into_iter()
            .map(|v| VideoAsset {
                video_id: v.video_id,
                thumbnail_hash: v.thumbnail_hash,
                adlabels: labels(v.labels),
            })
            .collect(),
        titles: text_assets(input.titles),
        bodies: text_assets(input.bodies),
        descriptions: text_assets(input.descriptions),
        link_urls: input
            .link_urls
            .into_iter()
            .map(|l| LinkUrlAsset {
                display_url: l.display_url.or_else(|| Some(l.website_url.clone())),
                website_url: l.website_url,
                deeplink_url: l.deeplink_url,
                adlabels: labels(l.labels),
            })
            .collect(),
        call_to_action_types: input.call_to_action_types,
        asset_customization_rules: input
            .placements
            .into_iter()
            .map(|r| CustomizationRule {
                customization_spec: r.placement,
                image_label: label(r.image_label),
                video_label: label(r.video_label),
                carousel_label: label(r.carousel_label),
                title_label: label(r.title_label),
                body_label: label(r.body_label),
                description_label: label(r.description_label),
                link_url_label: label(r.link_url_label),
            })
            .collect(),
    };

    if let Some(missing) = spec.missing_labels().into_iter().next() {
        return Err(CampaignError::validation(format!(
            "Rule {} references label \"{}\" which does not exist in assets",
            missing.rule_index + 1,
            missing.label
        )));
    }

    debug!(
        rules = spec.asset_customization_rules.len(),
        images = spec.images.len(),
        videos = spec.videos.len(),
        "Built placement asset feed"
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_placement_input() -> AssetFeedInput {
        serde_json::from_value(json!({
            "images": [
                {"hash": "feedhash", "labels": ["feed_img"]},
                {"image_hash": "storyhash", "labels": ["story_img"]}
            ],
            "bodies": [{"text": "Shop the sale", "labels": ["body"]}],
            "linkUrls": [{"website_url": "https://example.com/sale", "labels": ["link"]}],
            "callToActionTypes": ["SHOP_NOW"],
            "placements": [
                {
                    "publisher_platforms": ["facebook"],
                    "facebook_positions": ["feed"],
                    "image_label": "feed_img",
                    "body_label": "body",
                    "link_url_label": "link"
                },
                {
                    "publisher_platforms": ["instagram"],
                    "instagram_positions": ["story"],
                    "image_label": "story_img",
                    "body_label": ""
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_builds_feed_with_defaults() {
        let spec = build_asset_feed_spec(two_placement_input()).unwrap();
        assert_eq!(spec.ad_formats, vec![DEFAULT_AD_FORMAT]);
        assert_eq!(spec.optimization_type, OptimizationType::Placement);
        assert_eq!(spec.images[1].hash, "storyhash");
        assert_eq!(
            spec.link_urls[0].display_url.as_deref(),
            Some("https://example.com/sale")
        );
        let second = &spec.asset_customization_rules[1];
        assert_eq!(second.image_label, Some(AdLabel::new("story_img")));
        assert!(second.body_label.is_none());
        assert!(spec.missing_labels().is_empty());
    }

    #[test]
    fn test_single_rule_rejected() {
        let mut input = two_placement_input();
        input.placements.truncate(1);
        let err = build_asset_feed_spec(input).unwrap_err();
        assert!(err.to_string().contains("at least 2 placement rules"));
    }

    #[test]
    fn test_unknown_label_names_rule_number() {
        let mut input = two_placement_input();
        input.placements[1].image_label = Some("reels_img".to_string());
        let err = build_asset_feed_spec(input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rule 2 references label \"reels_img\" which does not exist in assets"
        );
    }

    #[test]
    fn test_explore_home_needs_single_image() {
        let mut input = two_placement_input();
        input.ad_formats = vec!["SINGLE_VIDEO".to_string()];
        input.placements[1].placement.instagram_positions = vec!["explore_home".to_string()];
        assert!(build_asset_feed_spec(input).is_err());
    }
}
