use anyhow::{Context, Result};
use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::ProjectStore;
use crate::domain::{Project, ProjectData};

/// Database row for project
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    owner_id: String,
    data: Json<ProjectData>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PROJECT_COLUMNS: &str = "id, owner_id, data, created_at, updated_at";

#[derive(Clone)]
pub struct PgProjectStore {
    db: PgPool,
}

impl PgProjectStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn insert(&self, owner_id: &str, data: &ProjectData) -> Result<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (id, owner_id, job_name, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&data.job_name)
        .bind(Json(data))
        .fetch_one(&self.db)
        .await
        .context("Failed to insert project")?;

        Ok(row.into())
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        data: &ProjectData,
    ) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET job_name = $3, data = $4, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&data.job_name)
        .bind(Json(data))
        .fetch_optional(&self.db)
        .await
        .context("Failed to update project")?;

        Ok(row.map(Into::into))
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to load project")?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, owner_id: &str, limit: u32, offset: u32) -> Result<(Vec<Project>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await
            .context("Failed to count projects")?;

        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE owner_id = $1
            ORDER BY COALESCE(updated_at, created_at) DESC NULLS LAST, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.db)
        .await
        .context("Failed to list projects")?;

        Ok((rows.into_iter().map(Into::into).collect(), total as u64))
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .context("Failed to delete project")?;

        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
