//! Lookups against the synced-asset store that an ad set depends on:
//! the account's timezone and the promoted pixel's ownership.

use campaign_builder::parse_timezone;
use campaign_builder::validators::validate_pixel_permissions;
use campaign_core::assets::SyncedAssetStore;
use campaign_core::spec::PromotedObject;
use campaign_core::types::bare_account_id;
use campaign_core::{CampaignError, CampaignResult};
use chrono_tz::Tz;
use tracing::debug;

/// The zone schedule times are expressed in. An explicit request zone wins
/// over the synced account's zone; having neither is an error.
pub fn resolve_timezone(
    store: &dyn SyncedAssetStore,
    account_id: &str,
    requested: Option<&str>,
) -> CampaignResult<Tz> {
    if let Some(name) = requested.filter(|n| !n.trim().is_empty()) {
        return parse_timezone(name);
    }
    let account_zone = store
        .ad_account(account_id)
        .and_then(|account| account.timezone_name)
        .filter(|n| !n.trim().is_empty());
    match account_zone {
        Some(name) => parse_timezone(&name),
        None => Err(CampaignError::validation(format!(
            "No timezone known for ad account {}; sync the account or pass timezone",
            bare_account_id(account_id)
        ))),
    }
}

/// A promoted pixel is rejected only when both business ids are known and
/// differ. Unsynced pixels are left for the platform to check.
pub fn check_pixel_permissions(
    store: &dyn SyncedAssetStore,
    account_id: &str,
    promoted: Option<&PromotedObject>,
) -> CampaignResult<()> {
    let Some(pixel_id) = promoted.and_then(|p| p.pixel_id.as_deref()) else {
        return Ok(());
    };

    let owner_business = match store.pixel(account_id, pixel_id) {
        Some(pixel) => pixel.owner_business_id,
        None => {
            debug!(
                pixel_id,
                account_id = bare_account_id(account_id),
                "pixel not synced, skipping ownership check"
            );
            None
        }
    };
    let account_business = store
        .ad_account(account_id)
        .and_then(|account| account.business_id);

    validate_pixel_permissions(
        pixel_id,
        account_id,
        owner_business.as_deref(),
        account_business.as_deref(),
    )?;
    Ok(())
}
