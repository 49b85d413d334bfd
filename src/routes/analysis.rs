//! File analysis route
//!
//! Accepts a sliced print file and returns the estimated print time and
//! filament weight in the units the calculator form uses.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::AnalysisResponse;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;
use crate::services::cache::keys;

const FILE_FIELDS: [&str; 2] = ["file", "gcodeFile"];
const FALLBACK_MIME_TYPE: &str = "text/plain";

struct Upload {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Browsers report G-code as octet-stream or nothing at all.
fn effective_mime_type(declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        None | Some("") | Some("application/octet-stream") => FALLBACK_MIME_TYPE.to_string(),
        Some(mime) => mime.to_string(),
    }
}

/// Stable identity for an upload's content.
pub fn content_digest(bytes: &[u8]) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes)
}

fn upload_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("The uploaded file is too large.")
    } else {
        ApiError::bad_request(format!("Invalid upload: {}", e))
    }
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.gcode").to_string();
        let mime_type = effective_mime_type(field.content_type());
        let bytes = field.bytes().await.map_err(upload_error)?;

        if bytes.is_empty() {
            break;
        }

        return Ok(Upload {
            file_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request("No file uploaded."))
}

/// POST /analysis
pub async fn analyze_file(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<DataResponse<AnalysisResponse>> {
    let upload = read_upload(multipart).await?;
    let digest = content_digest(&upload.bytes);
    let cache_key = keys::analysis(state.ai_client.model(), digest);

    tracing::info!(
        user_id = %auth.user_id,
        file_name = %upload.file_name,
        mime_type = %upload.mime_type,
        size = upload.bytes.len(),
        "Analyzing print file"
    );

    if let Some(cache) = &state.cache {
        if let Some(cached) = cache.get::<AnalysisResponse>(&cache_key).await {
            return Ok(DataResponse::new(cached));
        }
    }

    let estimate = state
        .ai_client
        .analyze_gcode(
            &upload.file_name,
            &upload.mime_type,
            &upload.bytes,
            headers.request_id(),
        )
        .await?;

    let response = AnalysisResponse::from(estimate);

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&cache_key, &response).await {
            tracing::warn!(error = %e, "Failed to cache analysis result");
        }
    }

    Ok(DataResponse::new(response))
}
