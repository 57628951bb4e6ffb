//! Campaign builder: turns what the operator entered into validated specs
//! and the exact form fields the advertising platform accepts.

pub mod asset_feed;
pub mod request;
pub mod transform;
pub mod validators;

pub use asset_feed::{build_asset_feed_spec, AssetFeedInput};
pub use request::{
    AccountScoped, AdRequest, AdSetRequest, CampaignRequest, CreativeRequest, FullCampaignRequest,
};
pub use transform::{
    ad_form, ad_set_form, campaign_form, convert_budget_to_cents, creative_form,
    format_account_time, parse_schedule_time, parse_timezone, transform_targeting, FormPayload,
};
