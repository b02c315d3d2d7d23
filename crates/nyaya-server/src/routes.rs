use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use nyaya_core::{
    BreachReport, BreachRequest, CaseDetailsReport, CaseDetailsRequest, CaseTypeReport,
    CaseTypeRequest, Category, CategoryCount, FormOption, GuidanceError, QueryFilter,
    RightsRecord,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

// ── Error helper ──────────────────────────────────────────────────────────

/// `{error}` response body with its status.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map the guidance taxonomy onto HTTP. Service-side failures are logged
    /// with their cause and answered with `fallback` only.
    fn from_guidance(e: GuidanceError, fallback: &str) -> Self {
        match e {
            GuidanceError::InvalidArgument(msg) => Self::bad_request(msg),
            GuidanceError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: e.to_string(),
            },
            other => {
                tracing::error!("{fallback}: {other}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: fallback.to_string(),
                }
            },
        }
    }
}

pub(crate) fn internal(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("internal error: {e}");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal server error".into(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Query types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct RightsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub(crate) struct SearchQuery {
    pub q: Option<String>,
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::from_guidance(e, "Failed to parse category"))
}

// ── Router ────────────────────────────────────────────────────────────────

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(health))
        // Guidance
        .route("/api/analyze-breach", post(analyze_breach))
        .route("/api/find-case-type", post(find_case_type))
        .route("/api/get-case-details", post(get_case_details))
        // Rights library
        .route("/api/rights", get(list_rights))
        .route("/api/rights/search", get(search_rights))
        .route("/api/rights/categories", get(rights_categories))
        .route("/api/rights/category/:category", get(rights_by_category))
        .route("/api/rights/:id", get(get_right))
        // Form options
        .route("/api/contract-types", get(contract_types))
        .route("/api/problem-types", get(problem_types))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptimeSecs": state.start_time.elapsed().as_secs(),
        "rights": state.catalog.len(),
    }))
}

// Guidance

pub(crate) async fn analyze_breach(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BreachRequest>, JsonRejection>,
) -> ApiResult<BreachReport> {
    let Json(req) = body?;
    let call = state.guidance.default_call();
    state
        .guidance
        .analyze_breach(&req, &call)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_guidance(e, "Failed to analyze breach situation"))
}

pub(crate) async fn find_case_type(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CaseTypeRequest>, JsonRejection>,
) -> ApiResult<CaseTypeReport> {
    let Json(req) = body?;
    let call = state.guidance.default_call();
    state
        .guidance
        .find_case_type(&req, &call)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_guidance(e, "Failed to find appropriate case type"))
}

pub(crate) async fn get_case_details(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CaseDetailsRequest>, JsonRejection>,
) -> ApiResult<CaseDetailsReport> {
    let Json(req) = body?;
    let call = state.guidance.default_call();
    state
        .guidance
        .case_details(&req, &call)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_guidance(e, "Failed to fetch case details"))
}

// Rights library

pub(crate) async fn list_rights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RightsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query?;
    let mut filter = QueryFilter::default();
    if let Some(raw) = q.category.as_deref().filter(|c| !c.trim().is_empty()) {
        filter.category = Some(parse_category(raw)?);
    }
    filter.search = q.search;
    filter.page = q.page.unwrap_or(filter.page);
    filter.limit = q.limit.unwrap_or(filter.limit);

    let result = state
        .catalog
        .query(&filter)
        .map_err(|e| ApiError::from_guidance(e, "Failed to query rights library"))?;
    Ok(Json(serde_json::to_value(result).map_err(internal)?))
}

pub(crate) async fn search_rights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<RightsRecord>> {
    let Query(q) = query?;
    let found = state
        .catalog
        .search(q.q.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::from_guidance(e, "Failed to search rights library"))?;
    Ok(Json(found.into_iter().cloned().collect()))
}

pub(crate) async fn rights_categories(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<CategoryCount>> {
    Json(state.catalog.categories())
}

pub(crate) async fn rights_by_category(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<RightsRecord>> {
    let Path(raw) = path?;
    let category = parse_category(&raw)?;
    let records = state
        .catalog
        .by_category(category)
        .map_err(|e| ApiError::from_guidance(e, "Failed to query rights library"))?;
    Ok(Json(records.into_iter().cloned().collect()))
}

pub(crate) async fn get_right(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<RightsRecord> {
    let Path(id) = path?;
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .map_err(|e| ApiError::from_guidance(e, "Failed to fetch rights record"))
}

// Form options

pub(crate) async fn contract_types() -> Json<&'static [FormOption]> {
    Json(nyaya_domains::forms::contract_types())
}

pub(crate) async fn problem_types() -> Json<&'static [FormOption]> {
    Json(nyaya_domains::forms::problem_types())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use nyaya_core::{
        catalog::RightsCatalog,
        guidance::{GuidanceOrchestrator, RetryPolicy},
        model::ModelBackend,
    };
    use tower::ServiceExt;

    use super::*;

    const BREACH_JSON: &str = r#"{"isBreach": true, "confidence": 0.8,
        "explanation": "e", "remedies": ["r"], "nextSteps": ["n"]}"#;

    struct StubBackend {
        reply: anyhow::Result<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelBackend for StubBackend {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }

        fn name(&self) -> String {
            "stub".into()
        }
    }

    fn app_with(reply: anyhow::Result<String>) -> (Router, Arc<StubBackend>) {
        let backend = Arc::new(StubBackend {
            reply,
            calls: AtomicUsize::new(0),
        });
        let guidance = GuidanceOrchestrator::new(backend.clone())
            .with_retry(RetryPolicy::none())
            .with_timeout(Duration::from_secs(5));
        let state = Arc::new(AppState {
            catalog: Arc::new(nyaya_domains::seed_catalog().unwrap()),
            guidance,
            start_time: Instant::now(),
        });
        (router(state), backend)
    }

    fn app() -> Router {
        app_with(Ok(BREACH_JSON.into())).0
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["rights"], 6);
    }

    #[tokio::test]
    async fn test_analyze_breach_ok() {
        let (app, backend) = app_with(Ok(BREACH_JSON.into()));
        let req = post_json(
            "/api/analyze-breach",
            json!({"situation": "landlord kept my deposit", "contractType": "rental"}),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isBreach"], true);
        assert_eq!(body["contractType"], "rental");
        assert!(body["disclaimer"].as_str().is_some_and(|d| !d.is_empty()));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_analyze_breach_missing_field_is_400() {
        let (app, backend) = app_with(Ok(BREACH_JSON.into()));
        let req = post_json("/api/analyze-breach", json!({"contractType": "rental"}));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "situation is required");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400_not_422() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/analyze-breach")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_400() {
        let req = post_json(
            "/api/analyze-breach",
            json!({"situation": 42, "contractType": "rental"}),
        );
        let (status, _) = send(app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_failure_is_500_with_safe_message() {
        let (app, _) = app_with(Err(anyhow::anyhow!("upstream key rejected: k-secret")));
        let req = post_json(
            "/api/analyze-breach",
            json!({"situation": "deposit", "contractType": "rental"}),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to analyze breach situation");
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_500() {
        let (app, _) = app_with(Ok("not json at all".into()));
        let req = post_json(
            "/api/get-case-details",
            json!({"problemType": "rental", "caseType": "Civil suit"}),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch case details");
    }

    #[tokio::test]
    async fn test_find_case_type_ok() {
        let reply = r#"{"recommendedCases": [{"type": "Consumer complaint",
            "description": "d", "likelihood": "High", "timeframe": "t", "cost": "c"}],
            "generalAdvice": "g", "estimatedSuccess": 0.7}"#;
        let (app, _) = app_with(Ok(reply.into()));
        let req = post_json("/api/find-case-type", json!({"problemType": "consumer"}));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["problemType"], "consumer");
        assert_eq!(body["recommendedCases"][0]["type"], "Consumer complaint");
        assert_eq!(body["recommendedCases"][0]["likelihood"], "High");
    }

    #[tokio::test]
    async fn test_list_rights_paginates() {
        let (status, body) = send(app(), get_req("/api/rights?page=2&limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 6);
        assert_eq!(body["page"], 2);
        let ids: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_list_rights_filters() {
        let (status, body) =
            send(app(), get_req("/api/rights?category=employment&search=WAGES")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["successRate"], "High (80-90%)");
    }

    #[tokio::test]
    async fn test_list_rights_rejects_bad_params() {
        let (status, _) = send(app(), get_req("/api/rights?category=space")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(app(), get_req("/api/rights?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(app(), get_req("/api/rights?limit=many")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_rights() {
        let (status, body) = send(app(), get_req("/api/rights/search?q=deposit")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Security Deposit Not Returned");

        let (status, body) = send(app(), get_req("/api/rights/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "search query is required");
    }

    #[tokio::test]
    async fn test_rights_by_category_and_categories() {
        let (status, body) = send(app(), get_req("/api/rights/category/insurance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = send(app(), get_req("/api/rights/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0], json!({"category": "employment", "count": 2}));
    }

    #[tokio::test]
    async fn test_get_right_by_id() {
        let (status, body) = send(app(), get_req("/api/rights/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Unpaid Wages");

        let (status, body) = send(app(), get_req("/api/rights/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "rights record 999 not found");

        let (status, _) = send(app(), get_req("/api/rights/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_options() {
        let (status, body) = send(app(), get_req("/api/contract-types")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0], json!({"value": "general", "label": "General Contract"}));

        let (_, body) = send(app(), get_req("/api/problem-types")).await;
        assert_eq!(body.as_array().map(Vec::len), Some(7));
    }

    #[test]
    fn test_catalog_from_json_matches_seed_shape() {
        let seed = nyaya_domains::seed_catalog().unwrap();
        let json = serde_json::to_string(seed.records()).unwrap();
        let reloaded = RightsCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.records(), seed.records());
    }
}
