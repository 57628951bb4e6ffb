//! Read side of the synced-asset store: ad accounts, pages, pixels and
//! businesses previously pulled from the platform.
//!
//! The sync job owns the writes. The campaign pipeline only reads account
//! timezones and pixel ownership from here.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::types::bare_account_id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdAccount {
    /// Bare numeric id, without the `act_` prefix.
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// IANA zone name, e.g. `America/Los_Angeles`.
    #[serde(default)]
    pub timezone_name: Option<String>,
    #[serde(default)]
    pub business_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub page_id: String,
    pub name: String,
    #[serde(default)]
    pub business_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pixel {
    pub pixel_id: String,
    pub name: String,
    pub account_id: String,
    #[serde(default)]
    pub owner_business_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub business_id: String,
    pub name: String,
}

pub trait SyncedAssetStore: Send + Sync {
    fn ad_account(&self, account_id: &str) -> Option<AdAccount>;
    fn page(&self, page_id: &str) -> Option<Page>;
    fn pixels_for_account(&self, account_id: &str) -> Vec<Pixel>;
    fn businesses(&self) -> Vec<Business>;

    fn pixel(&self, account_id: &str, pixel_id: &str) -> Option<Pixel> {
        self.pixels_for_account(account_id)
            .into_iter()
            .find(|p| p.pixel_id == pixel_id)
    }
}

/// In-memory store backed by DashMap, keyed by bare ids.
#[derive(Default)]
pub struct InMemoryAssetStore {
    accounts: DashMap<String, AdAccount>,
    pages: DashMap<String, Page>,
    pixels: DashMap<String, Pixel>,
    businesses: DashMap<String, Business>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        info!("Synced asset store initialized (in-memory)");
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn upsert_ad_account(&self, mut account: AdAccount) {
        account.account_id = bare_account_id(&account.account_id).to_string();
        self.accounts.insert(account.account_id.clone(), account);
    }

    pub fn upsert_page(&self, page: Page) {
        self.pages.insert(page.page_id.clone(), page);
    }

    pub fn upsert_pixel(&self, mut pixel: Pixel) {
        pixel.account_id = bare_account_id(&pixel.account_id).to_string();
        self.pixels.insert(pixel.pixel_id.clone(), pixel);
    }

    pub fn upsert_business(&self, business: Business) {
        self.businesses.insert(business.business_id.clone(), business);
    }
}

impl SyncedAssetStore for InMemoryAssetStore {
    fn ad_account(&self, account_id: &str) -> Option<AdAccount> {
        self.accounts
            .get(bare_account_id(account_id))
            .map(|r| r.value().clone())
    }

    fn page(&self, page_id: &str) -> Option<Page> {
        self.pages.get(page_id).map(|r| r.value().clone())
    }

    fn pixels_for_account(&self, account_id: &str) -> Vec<Pixel> {
        let account_id = bare_account_id(account_id);
        let mut pixels: Vec<Pixel> = self
            .pixels
            .iter()
            .filter(|r| r.value().account_id == account_id)
            .map(|r| r.value().clone())
            .collect();
        pixels.sort_by(|a, b| a.name.cmp(&b.name));
        pixels
    }

    fn businesses(&self) -> Vec<Business> {
        let mut businesses: Vec<Business> =
            self.businesses.iter().map(|r| r.value().clone()).collect();
        businesses.sort_by(|a, b| a.name.cmp(&b.name));
        businesses
    }
}
