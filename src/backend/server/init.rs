/**
 * Server Initialization
 *
 * Builds the application state from configuration and wires it into the
 * router.
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing CRM sync server");

    if config.tokens.is_empty() {
        tracing::warn!("No bearer tokens configured; sync endpoints are unauthenticated");
    } else {
        tracing::info!("Accepting {} bearer token(s)", config.tokens.len());
    }

    let app_state = AppState::new(config.tokens.clone());
    create_router(app_state)
}
