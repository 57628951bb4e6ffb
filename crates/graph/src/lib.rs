//! Resource clients for the advertising platform's graph API.

pub mod client;
pub mod resources;
pub mod response;

pub use client::{GraphClient, Resource};
pub use resources::AdPlatform;
pub use response::{CreatedResource, UploadedImage};
