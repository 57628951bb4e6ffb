//! Audience targeting, in the shape the operator submits it and in the
//! shape the platform expects on the wire.

use crate::types::GenderSelector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A country as the UI sends it: either a bare ISO code or a picker object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CountryEntry {
    Code(String),
    Detailed {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl CountryEntry {
    pub fn code(&self) -> &str {
        match self {
            CountryEntry::Code(code) => code,
            CountryEntry::Detailed { code, .. } => code,
        }
    }
}

/// Publisher platforms and per-platform positions. Used both as ad-set
/// placement targeting and as an asset-feed rule's `customization_spec`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlacementSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publisher_platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facebook_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instagram_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messenger_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_network_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threads_positions: Vec<String>,
}

impl PlacementSpec {
    pub fn is_empty(&self) -> bool {
        self.publisher_platforms.is_empty()
            && self.facebook_positions.is_empty()
            && self.instagram_positions.is_empty()
            && self.messenger_positions.is_empty()
            && self.audience_network_positions.is_empty()
            && self.threads_positions.is_empty()
    }

    pub fn has_platform(&self, platform: &str) -> bool {
        self.publisher_platforms.iter().any(|p| p == platform)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoLocationsInput {
    #[serde(default)]
    pub countries: Vec<CountryEntry>,
    #[serde(default)]
    pub excluded_countries: Vec<CountryEntry>,
    /// Regions, cities, zips and anything else passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Targeting as submitted by the campaign builder form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetingInput {
    #[serde(default)]
    pub geo_locations: GeoLocationsInput,
    #[serde(default)]
    pub age_min: Option<u8>,
    #[serde(default)]
    pub age_max: Option<u8>,
    #[serde(default)]
    pub gender: Option<GenderSelector>,
    /// Numeric codes, when the caller already speaks the wire format.
    #[serde(default)]
    pub genders: Option<Vec<u8>>,
    #[serde(default)]
    pub locales: Vec<u32>,
    #[serde(flatten)]
    pub placements: PlacementSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoLocations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_countries: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire-format targeting, serialized to a JSON string in the ad-set form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Targeting {
    pub geo_locations: GeoLocations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genders: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<u32>,
    #[serde(flatten)]
    pub placements: PlacementSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Targeting {
    pub fn gender(&self) -> Option<GenderSelector> {
        GenderSelector::from_codes(&self.genders)
    }
}
