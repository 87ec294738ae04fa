use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Who issued the request, as far as the upstream gateway tells us.
/// Anonymous callers carry `None` and are never logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Option<i64>,
}

pub async fn resolve_caller(mut request: Request, next: Next) -> Response {
    let identity = CallerIdentity {
        user_id: parse_user_id(request.headers()),
    };
    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn parse_user_id(headers: &HeaderMap) -> Option<i64> {
    let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
