mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::sync::Arc;

use services::{AiClient, MemoryProjectStore, PgProjectStore, ProjectStore, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting print cost calculator backend"
    );

    // Project store
    let store: Arc<dyn ProjectStore> = match &settings.database_url {
        Some(url) => {
            let pool = db::create_pool(url, settings.database_max_connections).await?;
            Arc::new(PgProjectStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set - projects are kept in memory only");
            Arc::new(MemoryProjectStore::new())
        }
    };

    // Redis cache
    let cache = match &settings.redis_url {
        Some(url) => Some(RedisCache::new(url, settings.redis_cache_ttl_seconds).await?),
        None => {
            tracing::info!("REDIS_URL not set - caching disabled");
            None
        }
    };

    let ai_client = AiClient::new(
        &settings.gemini_base_url,
        &settings.gemini_api_key,
        &settings.gemini_model,
        settings.ai_timeout_seconds,
    )?;

    tokio::spawn({
        let ai_client = ai_client.clone();
        async move {
            match ai_client.health_check().await {
                Ok(()) => tracing::info!("AI service is healthy"),
                Err(e) => tracing::warn!(error = %e, "AI service health check failed - will retry on first request"),
            }
        }
    });

    let jwks_cache = auth::JwksCache::new(
        reqwest::Client::new(),
        settings.auth_jwks_url.clone(),
        settings.auth_jwt_issuer.clone(),
        settings.auth_jwt_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    );

    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    let state = app::AppState::new(store, settings.clone(), jwks_cache, cache, ai_client);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
