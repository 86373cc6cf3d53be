/**
 * Router Configuration
 *
 * Combines the sync routes into a single Axum router.
 *
 * # Routes
 *
 * - `GET /health` - unauthenticated reachability probe
 * - `POST /api/sync/push` - apply one mutation (bearer token)
 * - `POST /api/sync/pull` - list changes after `?since=N` (bearer token)
 *
 * Every request is traced through `tower_http::trace::TraceLayer`.
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;
use crate::backend::sync::handlers::{health, pull, push};
use crate::shared::protocol::{HEALTH_PATH, PULL_PATH, PUSH_PATH};

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = Router::new()
        .route(PUSH_PATH, post(push))
        .route(PULL_PATH, post(pull))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route(HEALTH_PATH, get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
