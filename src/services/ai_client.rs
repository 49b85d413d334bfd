//! Generative-AI client for print file analysis.
//!
//! Sends the uploaded G-code (or any sliced print file) to the Gemini
//! `generateContent` endpoint as base64 inline data and asks for a JSON
//! object with the estimated print time and filament weight.

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::GcodeEstimate;
use crate::error::ApiError;

const ANALYSIS_PROMPT: &str = "You are an expert 3D printing analyst. \
Read the attached print file and extract the estimated printing time in seconds \
and the filament weight in grams. Slicers usually leave these in header or footer \
comments; if they are not stated, estimate them from the toolpath and extrusion totals. \
Reply with a JSON object of the form \
{\"printingTimeSeconds\": number, \"filamentWeightGrams\": number} and nothing else.";

/// Client for the Gemini API.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl AiClient {
    /// Create a new Gemini client.
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, model = model, "AI client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the configured model is reachable with our key.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        self.client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("AI service health check failed")?
            .error_for_status()
            .context("AI service unhealthy")?;

        Ok(())
    }

    /// Estimate print time and filament use for an uploaded print file.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn analyze_gcode(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
        request_id: Option<&str>,
    ) -> Result<GcodeEstimate, ApiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = build_request(file_name, mime_type, bytes);

        let mut req = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json");

        if let Some(rid) = request_id {
            req = req.header("x-request-id", rid);
        }

        debug!(url = %url, "AI service request");

        let response = req.json(&body).send().await.map_err(|e| {
            error!(error = %e, "AI service request failed");
            analysis_failed(format!("AI service unavailable: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GeminiErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("AI service error: {}", status));

            error!(status = %status, message = %message, "AI service error");
            return Err(analysis_failed(message));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to parse AI service response");
                analysis_failed(format!("Invalid AI service response: {}", e))
            })?;

        parse_estimate(parsed).map_err(analysis_failed)
    }
}

fn analysis_failed(reason: impl std::fmt::Display) -> ApiError {
    ApiError::upstream(format!("Failed to analyze file: {}", reason))
}

fn build_request(file_name: &str, mime_type: &str, bytes: &[u8]) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Text {
                    text: format!("{}\n\nFile name: {}", ANALYSIS_PROMPT, file_name),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: general_purpose::STANDARD.encode(bytes),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.0,
            response_mime_type: "application/json",
        },
    }
}

/// Pull the JSON estimate out of the first candidate's text.
fn parse_estimate(response: GenerateContentResponse) -> Result<GcodeEstimate, String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| "the model returned no answer".to_string())?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(format!("the model returned an empty answer ({})", reason));
    }

    serde_json::from_str(strip_code_fence(&text))
        .map_err(|e| format!("could not read the model's answer: {}", e))
}

/// Models sometimes wrap JSON in a Markdown fence despite the response MIME type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
