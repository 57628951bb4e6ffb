//! Route table for the inbound REST surface.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::rest::{self, AppState};

/// Room for multipart framing and the account field around the image.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn api_router(state: AppState) -> Router {
    let body_limit = state.uploads.max_image_bytes + UPLOAD_OVERHEAD_BYTES;

    Router::new()
        // Single resources
        .route("/api/campaigns/create", post(rest::create_campaign))
        .route("/api/adsets/create", post(rest::create_ad_set))
        .route("/api/creatives/create", post(rest::create_creative))
        .route(
            "/api/creatives/create-with-placements",
            post(rest::create_placement_creative),
        )
        .route("/api/ads/create", post(rest::create_ad))
        .route("/api/images/upload", post(rest::upload_image))
        // Orchestrated submission
        .route("/api/campaigns/create-full", post(rest::create_full))
        // Operational endpoints
        .route("/api/token/status", get(rest::token_status))
        .route("/health", get(rest::health_check))
        .fallback(rest::not_found)
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
