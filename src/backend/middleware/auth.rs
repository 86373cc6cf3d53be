/**
 * Authentication Middleware
 *
 * Protects the sync endpoints with a static bearer-token check. The token
 * set comes from server configuration; an empty set disables the check.
 */

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Reject requests without a known bearer token
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    if app_state.tokens.is_empty() {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::Unauthorized
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        BackendError::Unauthorized
    })?;

    if !app_state.tokens.contains(token.trim()) {
        tracing::warn!("Unknown bearer token");
        return Err(BackendError::Unauthorized);
    }

    Ok(next.run(request).await)
}
