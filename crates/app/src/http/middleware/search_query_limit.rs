use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Upper bound on the raw query string of a search request, checked before
/// any parameter parsing. A 256-character ASCII query fully percent-encoded
/// takes 768 bytes, leaving the rest for filter and paging parameters.
const MAX_SEARCH_QUERY_STRING_LEN: usize = 2048;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn enforce_search_query_length(req: Request, next: Next) -> Response {
    if is_query_too_long(req.uri().query()) {
        let body = ErrorBody {
            error: format!(
                "query string too long (max {} bytes)",
                MAX_SEARCH_QUERY_STRING_LEN
            ),
        };
        return (StatusCode::URI_TOO_LONG, axum::Json(body)).into_response();
    }
    next.run(req).await
}

fn is_query_too_long(query: Option<&str>) -> bool {
    query.is_some_and(|value| value.len() > MAX_SEARCH_QUERY_STRING_LEN)
}
