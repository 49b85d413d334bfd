//! Service layer: external integrations and project persistence.
//!
//! Contains the Redis cache, the Gemini file-analysis client, the project
//! stores and the project operations built on them.

pub mod ai_client;
pub mod cache;
pub mod projects;
pub mod store;

pub use ai_client::AiClient;
pub use cache::RedisCache;
pub use store::{MemoryProjectStore, PgProjectStore, ProjectStore};
