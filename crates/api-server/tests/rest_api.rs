use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use campaign_api::{api_router, AppState};
use campaign_core::assets::{AdAccount, InMemoryAssetStore};
use campaign_core::config::UploadConfig;
use campaign_core::credential::StaticCredentialProvider;
use campaign_core::spec::{AdSetSpec, AdSpec, CampaignSpec, CreativeSpec};
use campaign_core::types::Objective;
use campaign_core::{CampaignError, CampaignResult, Credential, PlatformErrorBody};
use campaign_graph::{AdPlatform, CreatedResource, UploadedImage};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// Fake platform
// ============================================================================

#[derive(Default)]
struct FakePlatform {
    /// (operation, token) per call.
    calls: Mutex<Vec<(String, String)>>,
    reject_ad_sets: bool,
}

impl FakePlatform {
    fn created(&self, op: &str, credential: &Credential) -> CampaignResult<CreatedResource> {
        self.calls
            .lock()
            .push((op.to_string(), credential.token.expose().to_string()));
        let id = format!("{op}-1");
        Ok(CreatedResource {
            raw: json!({ "id": id }),
            id,
        })
    }

    fn operations(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(op, _)| op.clone()).collect()
    }
}

#[async_trait]
impl AdPlatform for FakePlatform {
    async fn create_campaign(
        &self,
        credential: &Credential,
        _account_id: &str,
        _spec: &CampaignSpec,
    ) -> CampaignResult<CreatedResource> {
        self.created("campaign", credential)
    }

    async fn create_ad_set(
        &self,
        credential: &Credential,
        _account_id: &str,
        _campaign_id: &str,
        _objective: Objective,
        _spec: &AdSetSpec,
    ) -> CampaignResult<CreatedResource> {
        if self.reject_ad_sets {
            self.calls
                .lock()
                .push(("adset".to_string(), credential.token.expose().to_string()));
            return Err(CampaignError::Platform {
                status: 400,
                body: PlatformErrorBody {
                    message: "Invalid parameter".to_string(),
                    code: Some(100),
                    error_subcode: Some(1_487_756),
                    error_user_msg: Some("Your audience is too narrow.".to_string()),
                    ..Default::default()
                },
            });
        }
        self.created("adset", credential)
    }

    async fn create_creative(
        &self,
        credential: &Credential,
        _account_id: &str,
        _spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource> {
        self.created("creative", credential)
    }

    async fn create_placement_creative(
        &self,
        credential: &Credential,
        _account_id: &str,
        _spec: &CreativeSpec,
    ) -> CampaignResult<CreatedResource> {
        self.created("placement_creative", credential)
    }

    async fn create_ad(
        &self,
        credential: &Credential,
        _account_id: &str,
        _adset_id: &str,
        _creative_id: &str,
        _spec: &AdSpec,
    ) -> CampaignResult<CreatedResource> {
        self.created("ad", credential)
    }

    async fn upload_image(
        &self,
        credential: &Credential,
        _account_id: &str,
        bytes: Vec<u8>,
        file_name: Option<&str>,
    ) -> CampaignResult<UploadedImage> {
        self.calls
            .lock()
            .push(("image".to_string(), credential.token.expose().to_string()));
        Ok(UploadedImage {
            hash: format!("hash-{}", bytes.len()),
            url: file_name.map(|n| format!("https://cdn.example/{n}")),
            raw: json!({"images": {}}),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app_with(platform: Arc<FakePlatform>, token: Option<&str>, max_image_bytes: usize) -> Router {
    let assets = InMemoryAssetStore::shared();
    assets.upsert_ad_account(AdAccount {
        account_id: "act_42".to_string(),
        name: "Storefront".to_string(),
        currency: Some("USD".to_string()),
        timezone_name: Some("America/New_York".to_string()),
        business_id: None,
    });
    let state = AppState::new(
        platform,
        assets,
        StaticCredentialProvider::shared(token.map(Credential::new)),
        UploadConfig { max_image_bytes },
    );
    api_router(state)
}

fn app(platform: Arc<FakePlatform>) -> Router {
    app_with(platform, Some("configured-tok"), 1024)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn full_submission() -> Value {
    json!({
        "adAccountId": "act_42",
        "campaign": {"name": "Promo", "objective": "OUTCOME_SALES", "status": "PAUSED"},
        "adset": {
            "name": "Promo ad set",
            "daily_budget": 2000,
            "targeting": {"geo_locations": {"countries": ["US"]}},
            "start_time": "2026-06-01T08:00:00"
        },
        "creative": {
            "name": "Promo creative",
            "object_story_spec": {
                "page_id": "5550001",
                "link_data": {"link": "https://shop.example.com/promo"}
            }
        },
        "ad": {"name": "Promo ad"}
    })
}

// ============================================================================
// Single resources
// ============================================================================

#[tokio::test]
async fn test_create_campaign_returns_id() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json(
            "/api/campaigns/create",
            json!({"adAccountId": "42", "name": "Promo", "objective": "OUTCOME_TRAFFIC"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["campaign_id"], "campaign-1");
    assert_eq!(body["data"]["id"], "campaign-1");
    assert_eq!(
        platform.calls.lock().clone(),
        vec![("campaign".to_string(), "configured-tok".to_string())]
    );
}

#[tokio::test]
async fn test_header_token_acts_for_other_principal() {
    let platform = Arc::new(FakePlatform::default());
    let mut request = post_json(
        "/api/campaigns/create",
        json!({"adAccountId": "42", "name": "Promo", "objective": "OUTCOME_TRAFFIC"}),
    );
    request
        .headers_mut()
        .insert("x-access-token", "client-tok".parse().unwrap());

    let response = app(platform.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(platform.calls.lock()[0].1, "client-tok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let platform = Arc::new(FakePlatform::default());
    let response = app_with(platform.clone(), None, 1024)
        .oneshot(post_json(
            "/api/campaigns/create",
            json!({"adAccountId": "42", "name": "Promo", "objective": "OUTCOME_TRAFFIC"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert!(platform.operations().is_empty());
}

#[tokio::test]
async fn test_unreadable_body_uses_error_envelope() {
    let platform = Arc::new(FakePlatform::default());
    let malformed = Request::builder()
        .method("POST")
        .uri("/api/campaigns/create")
        .header("content-type", "application/json")
        .body(Body::from("{\"adAccountId\": \"42\","))
        .unwrap();
    let response = app(platform.clone()).oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body: "));

    let missing_account = app(platform.clone())
        .oneshot(post_json("/api/ads/create", json!({"name": "Ad"})))
        .await
        .unwrap();
    assert_eq!(missing_account.status(), StatusCode::BAD_REQUEST);
    let body = read_json(missing_account).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("ad_account_id"));
    assert!(platform.operations().is_empty());
}

#[tokio::test]
async fn test_invalid_objective_is_bad_request() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json(
            "/api/campaigns/create",
            json!({"adAccountId": "42", "name": "Promo", "objective": "OUTCOME_FAME"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid objective: OUTCOME_FAME"));
    assert!(platform.operations().is_empty());
}

#[tokio::test]
async fn test_ad_set_requires_parent_campaign() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json(
            "/api/adsets/create",
            json!({
                "adAccountId": "42",
                "name": "Set",
                "campaign_objective": "OUTCOME_TRAFFIC",
                "daily_budget": 1500,
                "targeting": {"geo_locations": {"countries": ["US"]}}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "campaign_id is required");
}

#[tokio::test]
async fn test_ad_set_created_under_campaign() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json(
            "/api/adsets/create",
            json!({
                "adAccountId": "42",
                "name": "Set",
                "campaign_id": "c-9",
                "campaign_objective": "OUTCOME_TRAFFIC",
                "daily_budget": 1500,
                "targeting": {"geo_locations": {"countries": ["US"]}}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["adset_id"], "adset-1");
}

#[tokio::test]
async fn test_ad_requires_adset_id() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json(
            "/api/ads/create",
            json!({"adAccountId": "42", "name": "Ad", "creative_id": "cr-1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "adset_id is required");
}

// ============================================================================
// Images
// ============================================================================

fn multipart_upload(image: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        b"--XBOUNDARY\r\nContent-Disposition: form-data; name=\"adAccountId\"\r\n\r\nact_42\r\n",
    );
    body.extend_from_slice(
        b"--XBOUNDARY\r\nContent-Disposition: form-data; name=\"image\"; filename=\"hero.png\"\r\nContent-Type: image/png\r\n\r\n",
    );
    body.extend_from_slice(image);
    body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");

    Request::builder()
        .method("POST")
        .uri("/api/images/upload")
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_image_upload_returns_hash() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(multipart_upload(&[0x89, 0x50, 0x4E, 0x47]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["image_hash"], "hash-4");
    assert_eq!(body["url"], "https://cdn.example/hero.png");
    assert_eq!(platform.operations(), vec!["image".to_string()]);
}

#[tokio::test]
async fn test_oversized_image_rejected() {
    let platform = Arc::new(FakePlatform::default());
    let response = app_with(platform.clone(), Some("tok"), 4)
        .oneshot(multipart_upload(&[0u8; 16]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"],
        "Image exceeds the 4 byte upload limit"
    );
    assert!(platform.operations().is_empty());
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn test_create_full_returns_all_ids() {
    let platform = Arc::new(FakePlatform::default());
    let response = app(platform.clone())
        .oneshot(post_json("/api/campaigns/create-full", full_submission()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Campaign created successfully");
    assert_eq!(
        body["ids"],
        json!({
            "campaign_id": "campaign-1",
            "adset_id": "adset-1",
            "creative_id": "creative-1",
            "ad_id": "ad-1"
        })
    );
    assert_eq!(body["data"]["adset"]["id"], "adset-1");
    assert_eq!(platform.operations(), vec!["campaign", "adset", "creative", "ad"]);
}

#[tokio::test]
async fn test_create_full_partial_failure_reports_created_ids() {
    let platform = Arc::new(FakePlatform {
        reject_ad_sets: true,
        ..Default::default()
    });
    let response = app(platform.clone())
        .oneshot(post_json("/api/campaigns/create-full", full_submission()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Your audience is too narrow.");
    assert_eq!(body["error_details"]["error_subcode"], 1_487_756);
    assert_eq!(body["failed_stage"], "adset");
    assert_eq!(body["created_ids"], json!({"campaign_id": "campaign-1"}));
    assert_eq!(
        body["created_resources"],
        json!([{"resource_type": "campaign", "id": "campaign-1"}])
    );
    assert!(body["message"].as_str().unwrap().contains("created_ids"));
    assert_eq!(platform.operations(), vec!["campaign", "adset"]);
}

#[tokio::test]
async fn test_create_full_rejection_creates_nothing() {
    let platform = Arc::new(FakePlatform::default());
    let mut submission = full_submission();
    submission["ad"]["name"] = json!("  ");

    let response = app(platform.clone())
        .oneshot(post_json("/api/campaigns/create-full", submission))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["failed_stage"], "ad");
    assert_eq!(body["error"], "Ad name is required");
    assert_eq!(body["created_ids"], json!({}));
    assert!(platform.operations().is_empty());
}

// ============================================================================
// Operational
// ============================================================================

#[tokio::test]
async fn test_token_status_and_health() {
    let platform = Arc::new(FakePlatform::default());
    let router = app_with(platform, None, 1024);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/token/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "missing");

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json(response).await["status"], "healthy");
}
