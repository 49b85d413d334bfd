use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    /// `postgres` or `memory`
    pub storage_backend: String,
    pub storage: String,
    pub cache: String,
    pub ai_service: String,
}

fn label<E>(result: &Result<(), E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let cache_check = async {
        match &state.cache {
            Some(cache) => Some(cache.health_check().await),
            None => None,
        }
    };

    let (store_result, cache_result, ai_result) = tokio::join!(
        state.store.health_check(),
        cache_check,
        state.ai_client.health_check(),
    );

    let cache_status = cache_result.as_ref().map_or("disabled", label);
    let cache_ok = cache_result.as_ref().map_or(true, |r| r.is_ok());

    // Storage is critical, cache and AI only degrade the service
    let status = if store_result.is_err() {
        "unhealthy"
    } else if cache_ok && ai_result.is_ok() {
        "healthy"
    } else {
        "degraded"
    };

    let status_code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                storage_backend: state.store.backend().to_string(),
                storage: label(&store_result).to_string(),
                cache: cache_status.to_string(),
                ai_service: label(&ai_result).to_string(),
            },
        }),
    )
}
