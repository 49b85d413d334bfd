//! Fixtures shared by handler and auth tests: signed tokens, an app over the
//! in-memory store, and a local stand-in for the Gemini endpoint.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::{create_app, AppState};
use crate::auth::JwksCache;
use crate::config::{Environment, Settings};
use crate::services::{AiClient, MemoryProjectStore, ProjectStore};

pub const TEST_ISSUER: &str = "https://securetoken.google.com/printcalc-test";
pub const TEST_AUDIENCE: &str = "printcalc-test";
pub const TEST_MODEL: &str = "test-model";

const TEST_KID: &str = "test-key";
const PRIVATE_KEY: &str = include_str!("../fixtures/jwt_test_key.pem");
const PUBLIC_KEY: &str = include_str!("../fixtures/jwt_test_key.pub.pem");

/// Unreachable address: any request to it fails fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

pub fn sign<T: Serialize>(claims: &T) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// A valid one-hour token for `sub`.
pub fn bearer_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    sign(&json!({
        "sub": sub,
        "aud": TEST_AUDIENCE,
        "iss": TEST_ISSUER,
        "iat": now,
        "exp": now + 3600,
    }))
}

pub fn jwks_cache() -> JwksCache {
    let cache = JwksCache::new(
        reqwest::Client::new(),
        format!("{}/jwks", UNREACHABLE_URL),
        TEST_ISSUER.to_string(),
        TEST_AUDIENCE.to_string(),
        3600,
    );
    cache.insert_key(
        TEST_KID,
        DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
    );
    cache
}

fn settings(gemini_base_url: &str, max_upload_bytes: usize) -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        database_max_connections: 1,
        redis_url: None,
        redis_cache_ttl_seconds: 60,
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        auth_jwks_url: format!("{}/jwks", UNREACHABLE_URL),
        auth_jwt_issuer: TEST_ISSUER.to_string(),
        auth_jwt_audience: TEST_AUDIENCE.to_string(),
        jwks_cache_ttl_seconds: 3600,
        gemini_api_key: "test-api-key".to_string(),
        gemini_base_url: gemini_base_url.to_string(),
        gemini_model: TEST_MODEL.to_string(),
        ai_timeout_seconds: 5,
        analysis_max_upload_bytes: max_upload_bytes,
    }
}

/// Full application over a fresh in-memory store, no Redis.
pub fn app(gemini_base_url: &str, max_upload_bytes: usize) -> Router {
    let settings = settings(gemini_base_url, max_upload_bytes);
    let ai_client = AiClient::new(
        &settings.gemini_base_url,
        &settings.gemini_api_key,
        &settings.gemini_model,
        settings.ai_timeout_seconds,
    )
    .unwrap();
    let store: Arc<dyn ProjectStore> = Arc::new(MemoryProjectStore::new());

    create_app(AppState::new(store, settings, jwks_cache(), None, ai_client))
}

/// Serve a fixed `generateContent` reply on a local port; returns the base URL.
pub async fn mock_gemini(reply: Value) -> String {
    let mock = Router::new().route(
        "/models/:action",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Run one request through the router. Empty or non-JSON bodies come back as `Null`.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
