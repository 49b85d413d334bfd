use anyhow::Result;
use axum::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::HashMap;
use uuid::Uuid;

use super::ProjectStore;
use crate::domain::{Project, ProjectData};

/// Process-local store keyed by project id.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a record in as-is, timestamps included.
    #[cfg(test)]
    pub fn put(&self, project: Project) {
        self.projects.write().insert(project.id, project);
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn insert(&self, owner_id: &str, data: &ProjectData) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            data: data.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.projects.write().insert(project.id, project.clone());
        Ok(project)
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        data: &ProjectData,
    ) -> Result<Option<Project>> {
        let mut projects = self.projects.write();
        let Some(project) = projects.get_mut(&id).filter(|p| p.owner_id == owner_id) else {
            return Ok(None);
        };

        project.data = data.clone();
        project.updated_at = Some(Utc::now());
        Ok(Some(project.clone()))
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<Project>> {
        Ok(self
            .projects
            .read()
            .get(&id)
            .filter(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn list(&self, owner_id: &str, limit: u32, offset: u32) -> Result<(Vec<Project>, u64)> {
        let mut owned: Vec<Project> = self
            .projects
            .read()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();

        // None sorts below Some, so untimed records land last
        owned.sort_by_key(|p| (Reverse(p.last_touched()), p.id));

        let total = owned.len() as u64;
        let page = owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let mut projects = self.projects.write();
        match projects.get(&id) {
            Some(p) if p.owner_id == owner_id => {
                projects.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
