/**
 * Sync HTTP Handlers
 *
 * - `POST /api/sync/push` - apply one queued mutation
 * - `POST /api/sync/pull?since=N` - list changes after a cursor
 * - `GET /health` - reachability probe
 */

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::protocol::{PullResponse, PushRequest, PushResponse};

/// Query parameters of the pull endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PullParams {
    pub since: Option<u64>,
}

/// Apply a pushed mutation
pub async fn push(
    State(state): State<AppState>,
    Json(request): Json<PushRequest>,
) -> Result<Json<PushResponse>, BackendError> {
    let operation = request.operation;
    let model = request.model.clone();
    let record_id = request.record_id.clone();

    let result = state.store.write().await.apply(request);
    match result {
        Ok(seq) => {
            tracing::info!("Applied {} {} {} as change {}", operation, model, record_id, seq);
            Ok(Json(PushResponse { applied: true, seq }))
        }
        Err(e) => {
            tracing::warn!("Rejected {} {} {}: {}", operation, model, record_id, e);
            Err(e)
        }
    }
}

/// Return changes recorded after `since`
pub async fn pull(
    State(state): State<AppState>,
    Query(params): Query<PullParams>,
) -> Json<PullResponse> {
    let response = state.store.read().await.changes_since(params.since);
    tracing::debug!(
        "Pull since {:?} returned {} change(s)",
        params.since,
        response.changes.len()
    );
    Json(response)
}

pub async fn health() -> &'static str {
    "ok"
}
