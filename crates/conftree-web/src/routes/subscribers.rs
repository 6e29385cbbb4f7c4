//! Subscriber endpoints.
//!
//! # Endpoints
//!
//! ### `PUT /subscribers/v1/:name?url=<url>`
//! Create a subscriber named `:name` as a clone of the configured
//! template, or update an existing one. Either way the subscriber ends up
//! active with its `URL` property set to `url`.
//!
//! **Response:** `200 OK` with
//! ```json
//! { "status": "ok", "subscriber": "acme", "outcome": "created" }
//! ```
//! `404` when the base path or template is missing, `409` when a
//! concurrent creation won the race (retry as update), `500` on store
//! failure. A missing `url` query parameter is a `400`.
//!
//! ### `DELETE /subscribers/v1`
//! Set `active = "false"` on every subscriber under the base path.
//!
//! **Response:** `200 OK` with
//! ```json
//! { "status": "ok", "deactivated": 3 }
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, put},
    Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use conftree_core::{SubscriberError, SubscriberOutcome};

use crate::AppState;

/// Create subscriber routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", delete(deactivate_all))
        .route("/:name", put(put_subscriber))
}

/// Query parameters for `PUT /subscribers/v1/:name`.
#[derive(Debug, Deserialize)]
struct PutSubscriberParams {
    url: String,
}

/// Handler error: a core subscriber error plus its HTTP mapping.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ApiError(#[from] SubscriberError);

/// Map a subscriber error onto its HTTP status.
fn status_for(err: &SubscriberError) -> StatusCode {
    match err {
        SubscriberError::NotFound(_) => StatusCode::NOT_FOUND,
        SubscriberError::NameConflict(_) => StatusCode::CONFLICT,
        SubscriberError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        warn!(status = %status, "subscriber request failed: {}", self.0);
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// PUT /subscribers/v1/:name
async fn put_subscriber(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PutSubscriberParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store.write().await;
    let outcome = state
        .manager
        .create_or_update(&mut *store, &name, &params.url)?;

    let outcome = match outcome {
        SubscriberOutcome::Created => "created",
        SubscriberOutcome::Updated => "updated",
    };
    info!(subscriber = %name, url = %params.url, outcome, "subscriber stored");

    Ok(Json(serde_json::json!({
        "status": "ok",
        "subscriber": name,
        "outcome": outcome,
    })))
}

/// DELETE /subscribers/v1
async fn deactivate_all(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store.write().await;
    let count = state.manager.deactivate_all(&mut *store)?;
    info!(count, "deactivated all subscribers");

    Ok(Json(serde_json::json!({
        "status": "ok",
        "deactivated": count,
    })))
}
