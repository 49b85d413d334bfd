//! Project routes
//!
//! Saved calculator forms, scoped to the authenticated user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{ProjectResponse, SaveProjectRequest};
use crate::error::ApiResult;
use crate::services::cache::keys;
use crate::services::projects;

/// Move the owner's list cache to a new generation after a write.
async fn invalidate_project_lists(state: &AppState, owner_id: &str) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache
            .bump(&keys::project_list_generation(owner_id))
            .await
        {
            tracing::warn!(error = %e, "Failed to invalidate project list cache");
        }
    }
}

/// Cache key for a list page, bound to the generation current before the store is read.
async fn project_list_cache_key(
    state: &AppState,
    owner_id: &str,
    pagination: &PaginationParams,
) -> Option<String> {
    let cache = state.cache.as_ref()?;
    match cache.counter(&keys::project_list_generation(owner_id)).await {
        Ok(generation) => Some(keys::project_list(
            owner_id,
            generation,
            pagination.page(),
            pagination.per_page(),
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read project list generation");
            None
        }
    }
}

/// POST /projects
///
/// Create a project, or update one when the body carries an `id`.
pub async fn save_project(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(
        user_id = %auth.user_id,
        project_id = ?req.id,
        "Saving project"
    );

    let saved = projects::save_project(state.store.as_ref(), &auth.user_id, req).await?;

    invalidate_project_lists(&state, &auth.user_id).await;

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, DataResponse::new(ProjectResponse::from(saved.project))))
}

/// GET /projects
///
/// Most recently touched first.
pub async fn list_projects(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Paginated<ProjectResponse>> {
    tracing::info!(
        user_id = %auth.user_id,
        page = pagination.page(),
        per_page = pagination.per_page(),
        "Listing projects"
    );

    let cache_key = project_list_cache_key(&state, &auth.user_id, &pagination).await;
    if let (Some(cache), Some(key)) = (&state.cache, &cache_key) {
        if let Some(cached) = cache.get::<Paginated<ProjectResponse>>(key).await {
            return Ok(cached);
        }
    }

    let (rows, total) = projects::list_projects(
        state.store.as_ref(),
        &auth.user_id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    let data: Vec<ProjectResponse> = rows.into_iter().map(Into::into).collect();
    let page = Paginated::new(data, &pagination, total);

    if let (Some(cache), Some(key)) = (&state.cache, &cache_key) {
        if let Err(e) = cache.set(key, &page).await {
            tracing::warn!(error = %e, "Failed to cache project list");
        }
    }

    Ok(page)
}

/// GET /projects/:project_id
pub async fn get_project(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<DataResponse<ProjectResponse>> {
    tracing::debug!(
        user_id = %auth.user_id,
        project_id = %project_id,
        "Getting project"
    );

    let project = projects::get_project(state.store.as_ref(), &auth.user_id, project_id).await?;
    Ok(DataResponse::new(project.into()))
}

/// DELETE /projects/:project_id
pub async fn delete_project(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!(
        user_id = %auth.user_id,
        project_id = %project_id,
        "Deleting project"
    );

    projects::delete_project(state.store.as_ref(), &auth.user_id, project_id).await?;
    invalidate_project_lists(&state, &auth.user_id).await;

    Ok(StatusCode::NO_CONTENT)
}
