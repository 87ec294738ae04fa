use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("admin auth not configured")]
    MissingConfig,
    #[error("admin token required")]
    MissingToken,
    #[error("admin token invalid")]
    InvalidToken,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminTokenPayload {
    exp: i64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Guards the analytics and maintenance routes. Tokens are
/// `<payload>.<signature>` where the payload carries an expiry and the
/// signature is HMAC-SHA256 over the encoded payload.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AdminAuthError> {
    let secret = state
        .config
        .admin_token_secret
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(AdminAuthError::MissingConfig)?;

    let token = extract_bearer_token(&request).ok_or(AdminAuthError::MissingToken)?;
    if !verify_token(secret, &token, Utc::now().timestamp()) {
        return Err(AdminAuthError::InvalidToken);
    }
    Ok(next.run(request).await)
}

pub fn issue_token(secret: &str, max_age_secs: i64) -> Result<String, AdminAuthError> {
    let exp = Utc::now().timestamp().saturating_add(max_age_secs);
    let json = serde_json::to_vec(&AdminTokenPayload { exp })
        .map_err(|_| AdminAuthError::InvalidToken)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(json);
    let signature = URL_SAFE_NO_PAD.encode(mac_for(secret, &payload_b64)?.finalize().into_bytes());
    Ok(format!("{payload_b64}.{signature}"))
}

fn verify_token(secret: &str, token: &str, now: i64) -> bool {
    let Some((payload_b64, sig_b64)) = token.split_once('.') else {
        return false;
    };
    if payload_b64.is_empty() || sig_b64.is_empty() {
        return false;
    }
    let Ok(signature) = URL_SAFE_NO_PAD.decode(sig_b64.as_bytes()) else {
        return false;
    };
    let Ok(mac) = mac_for(secret, payload_b64) else {
        return false;
    };
    if mac.verify_slice(&signature).is_err() {
        return false;
    }
    decode_payload(payload_b64).is_some_and(|payload| payload.exp > now)
}

fn mac_for(secret: &str, payload_b64: &str) -> Result<HmacSha256, AdminAuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AdminAuthError::MissingConfig)?;
    mac.update(payload_b64.as_bytes());
    Ok(mac)
}

fn decode_payload(payload_b64: &str) -> Option<AdminTokenPayload> {
    let bytes = URL_SAFE_NO_PAD.decode(payload_b64.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn extract_bearer_token<B>(request: &Request<B>) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AdminAuthError::MissingConfig => StatusCode::SERVICE_UNAVAILABLE,
            AdminAuthError::MissingToken | AdminAuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
