//! Per-field validation of a project before it is persisted.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;

use super::projects::ProjectData;

/// Largest thumbnail accepted, decoded.
pub const MAX_PROJECT_IMAGE_BYTES: usize = 500 * 1024;

const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collect every problem with `data`. An empty list means it can be saved.
pub fn validate_project(data: &ProjectData) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let inputs = &data.inputs;

    if data.job_name.trim().is_empty() {
        errors.push(FieldError::new("jobName", "Job name is required."));
    }
    if data.filament_type.trim().is_empty() {
        errors.push(FieldError::new("filamentType", "Filament type is required."));
    }
    if inputs.currency_code.trim().is_empty() {
        errors.push(FieldError::new("currencyCode", "Currency is required."));
    }

    let numbers = [
        ("printingTimeHours", inputs.printing_time_hours),
        ("printingTimeMinutes", inputs.printing_time_minutes),
        ("filamentWeightGrams", inputs.filament_weight_grams),
        ("spoolWeightGrams", inputs.spool_weight_grams),
        ("spoolPrice", inputs.spool_price),
        ("powerConsumptionWatts", inputs.power_consumption_watts),
        ("energyCostPerKwh", inputs.energy_cost_per_kwh),
        ("prepTimeMinutes", inputs.prep_time_minutes),
        ("prepCostPerHour", inputs.prep_cost_per_hour),
        ("postProcessingTimeHours", inputs.post_processing_time_hours),
        ("postProcessingTimeMinutes", inputs.post_processing_time_minutes),
        ("postProcessingCostPerHour", inputs.post_processing_cost_per_hour),
        ("printerCost", inputs.printer_cost),
        ("investmentReturnYears", inputs.investment_return_years),
        ("repairCost", inputs.repair_cost),
        ("profitPercentage", inputs.profit_percentage),
        ("vatPercentage", inputs.vat_percentage),
    ];
    for (field, value) in numbers {
        if !value.is_finite() || value < 0.0 {
            errors.push(FieldError::new(field, "Must be zero or greater."));
        }
    }

    if !(inputs.printing_time_hours > 0.0 || inputs.printing_time_minutes > 0.0) {
        errors.push(FieldError::new(
            "printingTimeHours",
            "Total printing time is required.",
        ));
    }
    if inputs.filament_weight_grams < 0.01 {
        errors.push(FieldError::new(
            "filamentWeightGrams",
            "Filament weight is required.",
        ));
    }
    if inputs.spool_price < 0.01 {
        errors.push(FieldError::new("spoolPrice", "Spool price is required."));
    }
    if inputs.spool_weight_grams < 1.0 {
        errors.push(FieldError::new("spoolWeightGrams", "Spool weight is required."));
    }

    for (index, line) in inputs.other_cost_lines.iter().enumerate() {
        if line.name.trim().is_empty() {
            errors.push(FieldError::new(
                format!("otherCostLines.{}.name", index),
                "Item name cannot be empty.",
            ));
        }
        if !line.price.is_finite() || line.price < 0.0 {
            errors.push(FieldError::new(
                format!("otherCostLines.{}.price", index),
                "Must be zero or greater.",
            ));
        }
    }

    if let Some(image) = data.project_image.as_deref().filter(|s| !s.is_empty()) {
        if let Err(message) = check_image_data_url(image) {
            errors.push(FieldError::new("projectImage", message));
        }
    }

    errors
}

/// Accept only base64 `data:` URLs of common web image types within the size cap.
fn check_image_data_url(data_url: &str) -> Result<(), String> {
    let body = data_url
        .strip_prefix("data:")
        .ok_or_else(|| "Image must be a data URL.".to_string())?;
    let (header, payload) = body
        .split_once(',')
        .ok_or_else(|| "Invalid data URL format.".to_string())?;

    let mut header_parts = header.split(';');
    let mime_type = header_parts.next().unwrap_or_default().to_lowercase();
    if !header_parts.any(|part| part == "base64") {
        return Err("Only base64-encoded images are supported.".to_string());
    }
    if !SUPPORTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
        return Err(format!("Unsupported image format: {}", mime_type));
    }

    let decoded = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("Invalid base64 data: {}", e))?;
    if decoded.len() > MAX_PROJECT_IMAGE_BYTES {
        return Err(format!(
            "Image cannot exceed {} KB.",
            MAX_PROJECT_IMAGE_BYTES / 1024
        ));
    }

    Ok(())
}
