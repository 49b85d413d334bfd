use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database (unset -> in-memory project store)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Redis (unset -> no caching)
    pub redis_url: Option<String>,
    pub redis_cache_ttl_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth
    pub auth_jwks_url: String,
    pub auth_jwt_issuer: String,
    pub auth_jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // File analysis
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout_seconds: u64,
    pub analysis_max_upload_bytes: usize,
}

/// Non-empty value of an environment variable.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = optional_var("DATABASE_URL");
        let database_max_connections = parsed_var("DATABASE_MAX_CONNECTIONS", 10);

        // Redis
        let redis_url = optional_var("REDIS_URL");
        let redis_cache_ttl_seconds = parsed_var("REDIS_CACHE_TTL_SECONDS", 3600); // 1 hour default

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth
        let auth_jwks_url = env::var("AUTH_JWKS_URL").unwrap_or_else(|_| {
            "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                .to_string()
        });
        let auth_jwt_issuer =
            env::var("AUTH_JWT_ISSUER").context("AUTH_JWT_ISSUER must be set")?;
        let auth_jwt_audience =
            env::var("AUTH_JWT_AUDIENCE").context("AUTH_JWT_AUDIENCE must be set")?;
        let jwks_cache_ttl_seconds = parsed_var("JWKS_CACHE_TTL_SECONDS", 1800); // 30 minutes default

        // File analysis
        let gemini_api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let gemini_base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        url::Url::parse(&gemini_base_url).context("GEMINI_BASE_URL is not a valid URL")?;
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let ai_timeout_seconds = parsed_var("AI_TIMEOUT_SECONDS", 120); // 2 minutes default for LLM calls
        let analysis_max_upload_bytes = parsed_var("ANALYSIS_MAX_UPLOAD_BYTES", 20 * 1024 * 1024);

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            redis_url,
            redis_cache_ttl_seconds,
            cors_allow_origins,
            auth_jwks_url,
            auth_jwt_issuer,
            auth_jwt_audience,
            jwks_cache_ttl_seconds,
            gemini_api_key,
            gemini_base_url,
            gemini_model,
            ai_timeout_seconds,
            analysis_max_upload_bytes,
        })
    }
}
