use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::http::middleware::caller_identity::{self, USER_ID_HEADER};
use crate::http::middleware::{admin_auth, search_query_limit};
use crate::http::routes::{admin, health, search, suggestions};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state);
    let admin = Router::new()
        .route("/search/analytics", get(admin::analytics::get_analytics))
        .route("/search/refresh", post(admin::refresh::post_refresh))
        .route(
            "/search/refresh/{product_id}",
            post(admin::refresh::post_refresh_product),
        )
        .route("/search/stats", get(admin::stats::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::require_admin,
        ));

    let mut router = Router::new()
        .route("/search/health", get(health::health))
        .route(
            "/search/products",
            get(search::get_search)
                .post(search::post_search)
                .layer(middleware::from_fn(search_query_limit::enforce_search_query_length)),
        )
        .route(
            "/search/suggestions",
            get(suggestions::get_suggestions).post(suggestions::post_suggestions),
        )
        .merge(admin)
        .layer(middleware::from_fn(caller_identity::resolve_caller))
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(state: &AppState) -> Option<CorsLayer> {
    let mut origins = Vec::new();
    let mut allow_any = false;
    for origin in state.config.cors_allow_origins.iter() {
        if is_wildcard_origin(origin) {
            allow_any = true;
            break;
        }
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => origins.push(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin ignored");
            }
        }
    }

    if !should_enable_cors(allow_any, &origins) {
        return None;
    }

    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);
    if allow_any {
        Some(cors.allow_origin(Any).allow_headers(Any))
    } else {
        Some(cors.allow_origin(AllowOrigin::list(origins)).allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ]))
    }
}

fn is_wildcard_origin(origin: &str) -> bool {
    origin.trim() == "*"
}

fn should_enable_cors(allow_any: bool, origins: &[HeaderValue]) -> bool {
    allow_any || !origins.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{build, is_wildcard_origin, should_enable_cors};
    use crate::http::middleware::admin_auth::issue_token;
    use crate::wiring::testing::{seeded_state, ADMIN_SECRET};
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderValue, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tokio::task::yield_now;
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
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

    fn admin(mut request: Request<Body>) -> Request<Body> {
        let token = issue_token(ADMIN_SECRET, 60).unwrap();
        request.headers_mut().insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        request
    }

    #[test]
    fn wildcard_origin_matches_trimmed_star() {
        assert!(is_wildcard_origin("*"));
        assert!(is_wildcard_origin(" * "));
        assert!(!is_wildcard_origin("https://example.com"));
    }

    #[test]
    fn cors_enablement_requires_origin_or_wildcard() {
        assert!(!should_enable_cors(false, &[]));
        assert!(should_enable_cors(true, &[]));
        assert!(should_enable_cors(false, &[HeaderValue::from_static("https://example.com")]));
    }

    #[tokio::test]
    async fn health_reports_modules() {
        let (state, _) = seeded_state().await;
        let (status, body) = send(&build(state), get("/search/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["modules"]["index"]["documents"], 4);
        assert_eq!(body["modules"]["database"]["configured"], false);
        assert_eq!(body["modules"]["adminAuth"]["configured"], true);
    }

    #[tokio::test]
    async fn get_search_returns_ranked_page() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, body) = send(
            &router,
            get("/search/products?query=nike&type=exact&sortBy=price&sortOrder=asc&limit=1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["meta"]["totalPages"], 2);
        assert_eq!(body["meta"]["limit"], 1);
        assert_eq!(body["meta"]["searchType"], "exact");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], 2);
        assert_eq!(body["filters"]["availability"], "active");
    }

    #[tokio::test]
    async fn post_search_applies_filters_and_logs_identified_callers() {
        let (state, log_store) = seeded_state().await;
        let router = build(state);
        let mut request = post_json(
            "/search/products",
            serde_json::json!({"query": "runner", "brandId": 2, "maxPrice": 100.0}),
        );
        request
            .headers_mut()
            .insert("x-user-id", HeaderValue::from_static("7"));
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["name"], "Puma Runner");
        assert_eq!(body["filters"]["brandIds"], serde_json::json!([2]));

        for _ in 0..10 {
            yield_now().await;
            if !log_store.entries().await.is_empty() {
                break;
            }
        }
        let entries = log_store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, Some(7));
        assert_eq!(entries[0].results_count, 1);
    }

    #[tokio::test]
    async fn invalid_search_input_is_bad_request() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, body) = send(&router, get("/search/products?query=%20%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("empty"));

        let (status, _) = send(
            &router,
            get("/search/products?query=nike&minPrice=50&maxPrice=10"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, get("/search/products?query=nike&limit=101")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_parameters_get_json_errors() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, body) = send(&router, get("/search/products?query=nike&type=bogus")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&router, get("/search/products?query=nike&page=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/search/products")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_query_string_is_rejected() {
        let (state, _) = seeded_state().await;
        let uri = format!("/search/products?query={}", "a".repeat(3000));
        let (status, _) = send(&build(state), get(&uri)).await;
        assert_eq!(status, StatusCode::URI_TOO_LONG);
    }

    #[tokio::test]
    async fn suggestions_simple_and_typed() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, body) = send(&router, get("/search/suggestions?query=ni&limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(names.contains(&"Nike Air Max"));

        let (status, body) = send(&router, get("/search/suggestions?query=n")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (status, body) = send(
            &router,
            post_json("/search/suggestions", serde_json::json!({"query": "nik"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body.as_array()
                .unwrap()
                .iter()
                .any(|item| item["suggestion"] == "Nike" && item["suggestionType"] == "brand")
        );
    }

    #[tokio::test]
    async fn admin_routes_require_token() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, _) = send(&router, get("/search/stats")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&router, admin(get("/search/stats"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDocuments"], 4);
        assert_eq!(body["activeDocuments"], 3);
    }

    #[tokio::test]
    async fn admin_routes_unavailable_without_secret() {
        let (mut state, _) = seeded_state().await;
        let mut config = (*state.config).clone();
        config.admin_token_secret = None;
        state.config = std::sync::Arc::new(config);
        let (status, _) = send(&build(state), get("/search/analytics")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn admin_refresh_and_analytics() {
        let (state, _) = seeded_state().await;
        let router = build(state);
        let (status, body) = send(
            &router,
            admin(post_json("/search/refresh", serde_json::json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Search index refreshed successfully");
        assert_eq!(body["stats"]["indexed"], 4);

        let (status, body) = send(
            &router,
            admin(post_json("/search/refresh/99", serde_json::json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "absent");

        let (status, body) = send(&router, admin(get("/search/analytics?daysBack=30"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_array());
    }
}
