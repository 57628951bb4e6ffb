//! Creative payloads: the standard object story and the placement
//! customization asset feed.

use crate::targeting::PlacementSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

// ─── Object story ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToAction {
    #[serde(rename = "type")]
    pub cta_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Website link story: headline, body, call to action and picture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkData {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<CallToAction>,
    /// `child_attachments`, `attachment_style` and other link fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Story for a standard creative. Besides `link_data`, story types such as
/// `video_data` and identity fields like `instagram_user_id` ride in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectStorySpec {
    pub page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_data: Option<LinkData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The companion story sent alongside an asset feed: page id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinimalStorySpec {
    pub page_id: String,
}

// ─── Asset feed ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdLabel {
    pub name: String,
}

impl AdLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAsset {
    pub hash: String,
    #[serde(default)]
    pub adlabels: Vec<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_crops: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoAsset {
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_hash: Option<String>,
    #[serde(default)]
    pub adlabels: Vec<AdLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextAsset {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub adlabels: Vec<AdLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkUrlAsset {
    pub website_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink_url: Option<String>,
    #[serde(default)]
    pub adlabels: Vec<AdLabel>,
}

/// Only placement-based customization is supported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OptimizationType {
    #[default]
    #[serde(rename = "PLACEMENT")]
    Placement,
}

impl OptimizationType {
    pub const PLACEMENT: &'static str = "PLACEMENT";
}

/// One per-placement rule: where it applies and which labelled asset of
/// each type to show there.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomizationRule {
    pub customization_spec: PlacementSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_label: Option<AdLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url_label: Option<AdLabel>,
}

impl CustomizationRule {
    /// `(label kind, label name)` for every label this rule references.
    pub fn referenced_labels(&self) -> Vec<(&'static str, &str)> {
        [
            ("image_label", &self.image_label),
            ("video_label", &self.video_label),
            ("carousel_label", &self.carousel_label),
            ("title_label", &self.title_label),
            ("body_label", &self.body_label),
            ("description_label", &self.description_label),
            ("link_url_label", &self.link_url_label),
        ]
        .into_iter()
        .filter_map(|(kind, label)| {
            label
                .as_ref()
                .filter(|l| !l.name.is_empty())
                .map(|l| (kind, l.name.as_str()))
        })
        .collect()
    }
}

/// A rule label with no matching asset label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingLabel {
    /// Zero-based index into `asset_customization_rules`.
    pub rule_index: usize,
    pub kind: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetFeedSpec {
    #[serde(default)]
    pub ad_formats: Vec<String>,
    pub optimization_type: OptimizationType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<VideoAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<TextAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bodies: Vec<TextAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<TextAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_urls: Vec<LinkUrlAsset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_to_action_types: Vec<String>,
    #[serde(default)]
    pub asset_customization_rules: Vec<CustomizationRule>,
}

impl AssetFeedSpec {
    /// Every label declared on any asset collection.
    pub fn declared_labels(&self) -> BTreeSet<&str> {
        let images = self.images.iter().flat_map(|a| a.adlabels.iter());
        let videos = self.videos.iter().flat_map(|a| a.adlabels.iter());
        let texts = self
            .titles
            .iter()
            .chain(self.bodies.iter())
            .chain(self.descriptions.iter())
            .flat_map(|a| a.adlabels.iter());
        let links = self.link_urls.iter().flat_map(|a| a.adlabels.iter());

        images
            .chain(videos)
            .chain(texts)
            .chain(links)
            .map(|l| l.name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Rule labels not declared on any asset, in rule order.
    pub fn missing_labels(&self) -> Vec<MissingLabel> {
        let declared = self.declared_labels();
        self.asset_customization_rules
            .iter()
            .enumerate()
            .flat_map(|(rule_index, rule)| {
                rule.referenced_labels()
                    .into_iter()
                    .filter(|(_, label)| !declared.contains(label))
                    .map(move |(kind, label)| MissingLabel {
                        rule_index,
                        kind,
                        label: label.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
