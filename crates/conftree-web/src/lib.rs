//! # conftree-web
//!
//! REST API surface for the subscriber activation service.
//!
//! This crate provides:
//! - The axum router exposing the subscriber endpoints
//! - Shared application state (store + subscriber manager)
//! - Mapping of core errors onto HTTP statuses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use conftree_web::{create_router, AppState};
//!
//! let state = AppState::new(store, manager);
//! let app = create_router(state);
//!
//! let listener = TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod routes;

// Re-exports
pub use routes::create_router;

use std::sync::Arc;

use conftree_core::{MemoryStore, SubscriberManager};
use tokio::sync::RwLock;

/// Shared state for all route handlers.
///
/// Handlers take the store's write lock for the whole operation; with the
/// in-memory store that lock is what serializes conflicting writers, so a
/// request either sees a fully committed state or waits.
#[derive(Clone)]
pub struct AppState {
    /// The config store behind the subscriber endpoints.
    pub store: Arc<RwLock<MemoryStore>>,
    /// Subscriber orchestration configured for this deployment.
    pub manager: Arc<SubscriberManager>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: MemoryStore, manager: SubscriberManager) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            manager: Arc::new(manager),
        }
    }
}
