//! HTTP route handlers for the subscriber activation service.

pub mod subscribers;

use axum::Router;

use crate::AppState;

/// Create the main axum router with all routes.
///
/// Routes are organized as:
/// - `/subscribers/v1/` - subscriber create/update and bulk deactivation
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/subscribers/v1", subscribers::routes())
        .with_state(state)
}
