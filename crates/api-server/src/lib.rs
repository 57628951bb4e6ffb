#![warn(clippy::unwrap_used)]

pub mod error;
pub mod rest;
pub mod router;
pub mod server;

pub use error::{ApiError, ApiJson, ApiResult, ErrorResponse};
pub use rest::AppState;
pub use router::api_router;
pub use server::ApiServer;
