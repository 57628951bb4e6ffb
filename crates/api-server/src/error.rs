//! Mapping of [`CampaignError`] onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_core::{CampaignError, PlatformErrorBody, ValidationError};
use serde::Serialize;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

/// Body shown for failures the caller cannot act on.
const INTERNAL_MESSAGE: &str = "Internal processing error";

#[derive(Debug)]
pub struct ApiError(pub CampaignError);

impl From<CampaignError> for ApiError {
    fn from(error: CampaignError) -> Self {
        Self(error)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self(CampaignError::Validation(error))
    }
}

/// A malformed or mistyped body is the caller's mistake.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CampaignError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// `Json` whose rejections use the same envelope as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub fn status_for(error: &CampaignError) -> StatusCode {
    match error {
        CampaignError::Validation(_) => StatusCode::BAD_REQUEST,
        CampaignError::Credential(_) => StatusCode::UNAUTHORIZED,
        CampaignError::Platform { .. } => StatusCode::BAD_GATEWAY,
        CampaignError::Transport(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Text returned in the `error` field. Internal failures are not echoed.
pub fn public_message(error: &CampaignError) -> String {
    if status_for(error) == StatusCode::INTERNAL_SERVER_ERROR {
        INTERNAL_MESSAGE.to_string()
    } else {
        error.user_message()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<PlatformErrorBody>,
}

impl ErrorResponse {
    pub fn from_error(error: &CampaignError) -> Self {
        Self {
            success: false,
            error: public_message(error),
            error_details: error.platform_body().cloned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }
        metrics::counter!("api.errors", "status" => status.as_u16().to_string()).increment(1);
        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}
