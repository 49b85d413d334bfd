//! Project persistence operations on top of a [`ProjectStore`].
//!
//! Saving is an upsert: a request without an id creates a project, a request
//! with an id merges the given fields over the stored ones. Both paths
//! validate the resulting record before anything is written.

use tracing::instrument;
use uuid::Uuid;

use crate::domain::{validate_project, Project, ProjectData, SaveProjectRequest};
use crate::error::{ApiError, ApiResult};
use crate::services::store::ProjectStore;

fn require_owner(owner_id: &str) -> ApiResult<()> {
    if owner_id.trim().is_empty() {
        return Err(ApiError::unauthorized("User is not authenticated."));
    }
    Ok(())
}

fn invalid_payload(e: serde_json::Error) -> ApiError {
    ApiError::bad_request(format!("Invalid project data: {}", e))
}

fn ensure_valid(data: &ProjectData) -> ApiResult<()> {
    let errors = validate_project(data);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn project_not_found() -> ApiError {
    ApiError::not_found("Project not found")
}

/// Result of a save: the stored record and whether it was newly created.
#[derive(Debug)]
pub struct SavedProject {
    pub project: Project,
    pub created: bool,
}

/// Create or update a project.
#[instrument(skip(store, request), fields(project_id = ?request.id))]
pub async fn save_project(
    store: &dyn ProjectStore,
    owner_id: &str,
    request: SaveProjectRequest,
) -> ApiResult<SavedProject> {
    require_owner(owner_id)?;

    let id = request
        .project_id()
        .map_err(|_| ApiError::bad_request("Invalid project id."))?;
    let fields = request.form_fields();

    match id {
        None => {
            let data = ProjectData::from_fields(fields).map_err(invalid_payload)?;
            ensure_valid(&data)?;

            let project = store.insert(owner_id, &data).await?;
            tracing::info!(project_id = %project.id, "Project created");
            Ok(SavedProject {
                project,
                created: true,
            })
        }
        Some(id) => {
            let stored = store
                .get(owner_id, id)
                .await?
                .ok_or_else(project_not_found)?;

            let data = stored.data.merged_with(fields).map_err(invalid_payload)?;
            ensure_valid(&data)?;

            let project = store
                .update(owner_id, id, &data)
                .await?
                .ok_or_else(project_not_found)?;
            tracing::info!(project_id = %project.id, "Project updated");
            Ok(SavedProject {
                project,
                created: false,
            })
        }
    }
}

pub async fn get_project(store: &dyn ProjectStore, owner_id: &str, id: Uuid) -> ApiResult<Project> {
    require_owner(owner_id)?;

    store.get(owner_id, id).await?.ok_or_else(project_not_found)
}

/// One page of the owner's projects plus the total count.
pub async fn list_projects(
    store: &dyn ProjectStore,
    owner_id: &str,
    limit: u32,
    offset: u32,
) -> ApiResult<(Vec<Project>, u64)> {
    require_owner(owner_id)?;

    Ok(store.list(owner_id, limit, offset).await?)
}

#[instrument(skip(store))]
pub async fn delete_project(store: &dyn ProjectStore, owner_id: &str, id: Uuid) -> ApiResult<()> {
    require_owner(owner_id)?;

    if !store.delete(owner_id, id).await? {
        return Err(project_not_found());
    }
    tracing::info!(project_id = %id, "Project deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryProjectStore;
    use serde_json::json;

    const OWNER: &str = "owner-a";

    fn request(value: serde_json::Value) -> SaveProjectRequest {
        serde_json::from_value(value).unwrap()
    }

    fn benchy() -> SaveProjectRequest {
        request(json!({
            "jobName": "Benchy",
            "filamentType": "PLA",
            "printingTimeHours": 1,
            "printingTimeMinutes": 30,
            "filamentWeightGrams": 15,
            "spoolPrice": 20,
            "vatPercentage": 21
        }))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryProjectStore::new();
        let created = save_project(&store, OWNER, benchy()).await.unwrap().project;

        let fetched = get_project(&store, OWNER, created.id).await.unwrap();
        assert_eq!(fetched.data.job_name, "Benchy");
        assert_eq!(fetched.data.inputs.spool_weight_grams, 1000.0);
        assert_eq!(fetched.owner_id, OWNER);
    }

    #[tokio::test]
    async fn test_update_merges_over_stored_fields() {
        let store = MemoryProjectStore::new();
        let created = save_project(&store, OWNER, benchy()).await.unwrap().project;

        let updated = save_project(
            &store,
            OWNER,
            request(json!({"id": created.id, "jobName": "Benchy v2", "vatPercentage": 0})),
        )
        .await
        .unwrap();

        assert!(!updated.created);
        let updated = updated.project;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.data.job_name, "Benchy v2");
        assert_eq!(updated.data.filament_type, "PLA");
        assert_eq!(updated.data.inputs.filament_weight_grams, 15.0);
        assert_eq!(updated.data.inputs.vat_percentage, 0.0);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.list(OWNER, 20, 0).await.unwrap().1, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = MemoryProjectStore::new();
        let err = save_project(
            &store,
            OWNER,
            request(json!({"id": Uuid::new_v4(), "jobName": "Ghost"})),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_project_is_not_written() {
        let store = MemoryProjectStore::new();
        let err = save_project(&store, OWNER, request(json!({"jobName": ""})))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "jobName"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.list(OWNER, 20, 0).await.unwrap().1, 0);
    }

    #[tokio::test]
    async fn test_invalid_update_keeps_stored_record() {
        let store = MemoryProjectStore::new();
        let created = save_project(&store, OWNER, benchy()).await.unwrap().project;

        let err = save_project(
            &store,
            OWNER,
            request(json!({"id": created.id, "filamentWeightGrams": -5})),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        let stored = get_project(&store, OWNER, created.id).await.unwrap();
        assert_eq!(stored.data.inputs.filament_weight_grams, 15.0);
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = MemoryProjectStore::new();
        let created = save_project(&store, OWNER, benchy()).await.unwrap().project;

        let err = get_project(&store, "owner-b", created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = save_project(
            &store,
            "owner-b",
            request(json!({"id": created.id, "jobName": "Mine now"})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_owner_is_rejected() {
        let store = MemoryProjectStore::new();

        let err = save_project(&store, "  ", benchy()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err = list_projects(&store, "", 20, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let store = MemoryProjectStore::new();
        let created = save_project(&store, OWNER, benchy()).await.unwrap().project;

        delete_project(&store, OWNER, created.id).await.unwrap();
        let err = delete_project(&store, OWNER, created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_id_creates() {
        let store = MemoryProjectStore::new();
        let saved = save_project(
            &store,
            OWNER,
            request(json!({
                "id": "",
                "jobName": "Hook",
                "filamentType": "PETG",
                "printingTimeMinutes": 40,
                "filamentWeightGrams": 8,
                "spoolPrice": 25
            })),
        )
        .await
        .unwrap();

        assert!(saved.created);
        assert_eq!(store.list(OWNER, 20, 0).await.unwrap().1, 1);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let store = MemoryProjectStore::new();
        let err = save_project(
            &store,
            OWNER,
            request(json!({"id": "project-7", "jobName": "Hook"})),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(store.list(OWNER, 20, 0).await.unwrap().1, 0);
    }
}
