//! Shared vocabulary for the campaign launcher: configuration, errors,
//! the campaign/ad-set/creative/ad model, credentials and synced assets.

pub mod assets;
pub mod config;
pub mod creative;
pub mod credential;
pub mod error;
pub mod spec;
pub mod targeting;
pub mod types;

pub use config::AppConfig;
pub use credential::{Credential, CredentialProvider};
pub use error::{CampaignError, CampaignResult, PlatformErrorBody, ValidationError};
