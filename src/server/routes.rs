//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinates;
use crate::discovery::{DiscoveryRequest, DiscoveryResponse, Target};
use crate::error::Error;
use crate::geo::{GeoBackend, GeoLocation};
use crate::poi::Category;
use crate::server::state::AppState;
use crate::source::SpatialProvider;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Create the API router
pub fn create_router<G, P>(state: Arc<AppState<G, P>>) -> Router
where
    G: GeoBackend + 'static,
    P: SpatialProvider,
{
    Router::new()
        .route("/api/discover", post(discover_handler::<G, P>))
        .route("/api/categories", get(categories_handler))
        .route("/api/status", get(status_handler::<G, P>))
        .route("/api/location", get(location_handler::<G, P>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Discover request body
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// Free text or "lat,lon"
    pub query: Option<String>,
    /// Latitude
    pub lat: Option<f64>,
    /// Longitude
    pub lng: Option<f64>,
    /// Categories to search; empty or missing means all
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl DiscoverRequest {
    fn into_request(self) -> Result<DiscoveryRequest, ApiError> {
        let target = match (self.query, self.lat, self.lng) {
            (Some(query), None, None) => Target::Text(query),
            (None, Some(lat), Some(lng)) => Target::Point(Coordinates::checked(lat, lng)?),
            (Some(_), _, _) => {
                return Err(ApiError::bad_request(
                    "Specify either query or lat/lng, not both",
                ))
            }
            _ => return Err(ApiError::bad_request("Either query or both lat and lng is required")),
        };

        Ok(DiscoveryRequest {
            target,
            categories: Vec::new(),
        }
        .with_categories(self.categories))
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    /// HTTP status for this error code
    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "LOCATION_NOT_FOUND" => StatusCode::NOT_FOUND,
            "GEOCODING_UNAVAILABLE" | "ALL_SOURCES_FAILED" => StatusCode::BAD_GATEWAY,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidRadius(_) => "INVALID_RADIUS",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::LocationNotFound(_) => "LOCATION_NOT_FOUND",
            Error::GeocodingUnavailable(_) => "GEOCODING_UNAVAILABLE",
            Error::AllSourcesFailed { .. } => "ALL_SOURCES_FAILED",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Discover POIs endpoint
///
/// POST /api/discover
async fn discover_handler<G, P>(
    State(state): State<Arc<AppState<G, P>>>,
    body: Result<Json<DiscoverRequest>, JsonRejection>,
) -> Result<Json<DiscoveryResponse>, ApiError>
where
    G: GeoBackend + 'static,
    P: SpatialProvider,
{
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = body.into_request()?;

    // A client disconnect drops this future, and with it every in-flight fetch
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.discovery.discover(request, &cancel).await {
        Ok(response) => {
            info!(id = %response.id, found = response.pois().len(), "discovery served");
            Ok(Json(response))
        }
        Err(e) => {
            warn!(error = %e, "discovery failed");
            Err(e.into())
        }
    }
}

/// One category and the tags that select it
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub label: String,
    pub tags: Vec<String>,
}

/// Categories list response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

/// List searchable categories
///
/// GET /api/categories
async fn categories_handler() -> Json<CategoriesResponse> {
    let categories = Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            name: c.to_string(),
            label: c.label().to_string(),
            tags: c.predicates().iter().map(ToString::to_string).collect(),
        })
        .collect();

    Json(CategoriesResponse { categories })
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Spatial provider in use
    pub provider: String,
    /// Number of searchable categories
    pub categories: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<G, P>(State(state): State<Arc<AppState<G, P>>>) -> Json<StatusResponse>
where
    G: GeoBackend + 'static,
    P: SpatialProvider,
{
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.discovery.controller().provider_name().to_string(),
        categories: Category::ALL.len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Get current location from IP address
///
/// GET /api/location
async fn location_handler<G, P>(
    State(state): State<Arc<AppState<G, P>>>,
) -> Result<Json<GeoLocation>, ApiError>
where
    G: GeoBackend + 'static,
    P: SpatialProvider,
{
    let location = state.locator.locate().await.map_err(|e| ApiError {
        error: e.to_string(),
        code: "GEOCODING_UNAVAILABLE".to_string(),
    })?;

    Ok(Json(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::discovery::Discovery;
    use crate::geo::ip_location::IpLocator;
    use crate::geo::resolver::testing::FakeGeocoder;
    use crate::geo::LocationResolver;
    use crate::search::{EscalationPolicy, RadiusEscalationController};
    use crate::source::testing::{feature, FakeProvider};
    use crate::source::{FetchLimits, SourceFetcher};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn create_test_app(geocoder: FakeGeocoder, provider: FakeProvider) -> Router {
        let policy = EscalationPolicy {
            backoff: Duration::ZERO,
            ..EscalationPolicy::default()
        };
        let limits = FetchLimits {
            per_query: Duration::from_millis(200),
            total: Duration::from_secs(5),
        };
        let controller =
            RadiusEscalationController::new(SourceFetcher::new(provider), policy, limits).unwrap();
        let discovery = Discovery::new(LocationResolver::new(geocoder), controller);
        let locator =
            IpLocator::with_url("http://127.0.0.1:9/json", Duration::from_secs(2)).unwrap();

        create_router(Arc::new(AppState::new(
            Config::default(),
            discovery,
            locator,
        )))
    }

    /// Six cafes within a few hundred meters of the Louvre
    fn louvre_cafes() -> FakeProvider {
        let cafes = (0..6)
            .map(|i| {
                let offset = 0.0005 * (i + 1) as f64;
                feature(
                    &format!("node/{}", i),
                    &format!("Café {}", i),
                    Category::Cafe,
                    48.8606 + offset,
                    2.3376,
                )
            })
            .collect();
        FakeProvider::new().with(Category::Cafe, cafes)
    }

    fn post_discover(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/discover")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_of(response: axum::response::Response) -> ApiError {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_test_app(FakeGeocoder::default(), FakeProvider::new());

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert_eq!(status.provider, "fake");
        assert_eq!(status.categories, 8);
    }

    #[tokio::test]
    async fn test_categories_endpoint() {
        let app = create_test_app(FakeGeocoder::default(), FakeProvider::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let categories: CategoriesResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(categories.categories.len(), 8);
        let bar = categories
            .categories
            .iter()
            .find(|c| c.name == "bar")
            .unwrap();
        assert!(bar.tags.contains(&"amenity=pub".to_string()));
    }

    #[tokio::test]
    async fn test_discover_by_coordinates() {
        let app = create_test_app(FakeGeocoder::default(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({
                "lat": 48.8606,
                "lng": 2.3376
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let discovery: DiscoveryResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(discovery.pois().len(), 6);
        assert_eq!(discovery.outcome.radius_used_meters, 1000.0);
        assert_eq!(discovery.outcome.attempts, 1);
        assert_eq!(discovery.request.categories.len(), 8);
        assert!(discovery.request.input.is_none());
        assert_eq!(discovery.pois()[0].id, "node/0");
    }

    #[tokio::test]
    async fn test_discover_by_query_with_categories() {
        let geocoder = FakeGeocoder::default().with_place("Louvre", 48.8606, 2.3376);
        let app = create_test_app(geocoder, louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({
                "query": "Louvre",
                "categories": ["cafe"]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let discovery: DiscoveryResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(discovery.request.categories, vec![Category::Cafe]);
        assert_eq!(discovery.request.input.as_deref(), Some("Louvre"));
        assert_eq!(discovery.metadata.location_name.as_deref(), Some("Louvre"));
        assert_eq!(discovery.pois().len(), 6);
    }

    #[tokio::test]
    async fn test_discover_location_not_found() {
        let app = create_test_app(FakeGeocoder::default(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({ "query": "Atlantis" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_of(response).await.code, "LOCATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_discover_geocoder_unavailable() {
        let app = create_test_app(FakeGeocoder::unavailable(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({ "query": "Paris" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error_of(response).await.code, "GEOCODING_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_discover_all_sources_failed() {
        let app = create_test_app(FakeGeocoder::default(), FakeProvider::new().failing_all());

        let response = app
            .oneshot(post_discover(serde_json::json!({ "lat": 1.0, "lng": 2.0 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error_of(response).await.code, "ALL_SOURCES_FAILED");
    }

    #[tokio::test]
    async fn test_discover_invalid_coordinates() {
        let app = create_test_app(FakeGeocoder::default(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({ "lat": 91.0, "lng": -74.006 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(response).await.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_discover_missing_location() {
        let app = create_test_app(FakeGeocoder::default(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({ "lat": 48.0 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(response).await.code, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_discover_unknown_category() {
        let app = create_test_app(FakeGeocoder::default(), louvre_cafes());

        let response = app
            .oneshot(post_discover(serde_json::json!({
                "lat": 48.8606,
                "lng": 2.3376,
                "categories": ["casino"]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(response).await.code, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = create_test_app(FakeGeocoder::default(), FakeProvider::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
