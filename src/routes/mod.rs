pub mod analysis;
pub mod health;
pub mod pricing;
pub mod projects;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .merge(pricing::pricing_router())
        // Protected routes
        .route(
            "/analysis",
            post(analysis::analyze_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/projects",
            get(projects::list_projects).post(projects::save_project),
        )
        .route(
            "/projects/:project_id",
            get(projects::get_project).delete(projects::delete_project),
        )
}
