//! review-window-server
//!
//! HTTP surface of the review window service: GitHub webhook endpoint,
//! octocrab-backed collaborators and the CLI configuration of the binary.

use axum::Router;
use axum::routing::{get, post};
use review_window_core::app::WindowScheduler;
use review_window_core::ports::RepositoryLookup;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod github;
pub mod health;
pub mod signature;
pub mod webhook;

pub use health::{health_handler, pending_handler};
pub use webhook::webhook_handler;

/// Shared state for the handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    scheduler: Arc<WindowScheduler>,
    lookup: Arc<dyn RepositoryLookup>,
    /// `None` disables signature verification.
    webhook_secret: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(
        scheduler: Arc<WindowScheduler>,
        lookup: Arc<dyn RepositoryLookup>,
        webhook_secret: Option<Vec<u8>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                scheduler,
                lookup,
                webhook_secret,
            }),
        }
    }

    pub fn scheduler(&self) -> &WindowScheduler {
        &self.inner.scheduler
    }

    pub fn lookup(&self) -> &dyn RepositoryLookup {
        self.inner.lookup.as_ref()
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/pending", get(pending_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
