use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware: the request must carry `Authorization: Bearer <API_TOKEN>`
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|reason| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), reason);
        ApiError::unauthorized("Unauthorized")
    })?;

    if token != state.config().security.api_token {
        tracing::warn!("Rejected {} {}: token mismatch", request.method(), request.uri().path());
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
