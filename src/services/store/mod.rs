//! Project persistence.
//!
//! All operations are scoped by owner id. `PgProjectStore` backs production;
//! `MemoryProjectStore` is used when no database is configured and in tests.

mod memory;
mod postgres;

pub use memory::MemoryProjectStore;
pub use postgres::PgProjectStore;

use anyhow::Result;
use axum::async_trait;
use uuid::Uuid;

use crate::domain::{Project, ProjectData};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Store a new project under a fresh id with both timestamps set to now.
    async fn insert(&self, owner_id: &str, data: &ProjectData) -> Result<Project>;

    /// Replace the stored fields and bump `updated_at`. `None` if the owner has no such project.
    async fn update(&self, owner_id: &str, id: Uuid, data: &ProjectData)
        -> Result<Option<Project>>;

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<Project>>;

    /// One page of the owner's projects, most recently touched first, plus the total count.
    async fn list(&self, owner_id: &str, limit: u32, offset: u32) -> Result<(Vec<Project>, u64)>;

    /// `false` if the owner has no such project.
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool>;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<()>;
}
