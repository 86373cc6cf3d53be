/**
 * Error Conversion
 *
 * Converts backend errors into HTTP responses so handlers can return them
 * directly.
 *
 * # Response Format
 *
 * Error responses use the shared [`ErrorBody`] shape:
 * ```json
 * { "conflict": true, "message": "Lead L1 does not exist" }
 * ```
 * `conflict` is only `true` for conflict errors.
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;
use crate::shared::protocol::ErrorBody;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if self.is_conflict() {
            ErrorBody::conflict(self.message())
        } else {
            ErrorBody::message(self.message())
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(body)).into_response()
    }
}
