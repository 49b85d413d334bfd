use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::coerce::{id_or_none, string_or_empty};
use super::pricing::{calculate, CostBreakdown, JobInputs};

/// Everything a user saves about one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub job_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub filament_type: String,
    /// Thumbnail as a `data:image/...;base64,` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_image: Option<String>,
    #[serde(flatten)]
    pub inputs: JobInputs,
}

impl ProjectData {
    /// Values a fresh calculator form starts with.
    pub fn form_defaults() -> Self {
        Self {
            job_name: String::new(),
            filament_type: String::new(),
            project_image: None,
            inputs: JobInputs {
                spool_price: 20.0,
                prep_cost_per_hour: 30.0,
                post_processing_cost_per_hour: 30.0,
                profit_percentage: 20.0,
                ..JobInputs::default()
            },
        }
    }

    /// Parse-and-default a set of top-level form fields.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }

    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Overlay `patch` on these fields. Keys absent from the patch keep their
    /// stored value; keys present replace it wholesale (arrays included).
    pub fn merged_with(&self, patch: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut fields = self.to_fields()?;
        for (key, value) in patch {
            fields.insert(key, value);
        }
        Self::from_fields(fields)
    }
}

/// Project entity
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: String,
    pub data: ProjectData,
    /// Legacy records may lack timestamps.
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Timestamp used for "most recently touched first" ordering.
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Request DTO for saving a project: an `id` updates, no `id` creates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveProjectRequest {
    /// Raw id as sent; blank means "new project".
    #[serde(default, deserialize_with = "id_or_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SaveProjectRequest {
    /// `Ok(None)` for a new project, an error if a non-blank id is not a UUID.
    pub fn project_id(&self) -> Result<Option<Uuid>, uuid::Error> {
        self.id.as_deref().map(Uuid::parse_str).transpose()
    }

    /// Drop keys that belong to the record rather than to the form.
    pub fn form_fields(mut self) -> Map<String, Value> {
        for key in ["id", "ownerId", "uid", "createdAt", "updatedAt", "breakdown"] {
            self.fields.remove(key);
        }
        self.fields
    }
}

/// Response DTO for project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: ProjectData,
    pub breakdown: CostBreakdown,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            breakdown: calculate(&p.data.inputs),
            data: p.data,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
