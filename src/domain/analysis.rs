//! File analysis domain types.
//!
//! The generative model reports raw seconds and grams; the form wants whole
//! hours and minutes and grams with two decimals.

use serde::{Deserialize, Serialize};

use super::coerce::number_or_zero;

/// Raw estimate as returned by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcodeEstimate {
    #[serde(deserialize_with = "number_or_zero")]
    pub printing_time_seconds: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub filament_weight_grams: f64,
}

/// Estimate merged into form units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub estimated_print_seconds: f64,
    pub estimated_filament_grams: f64,
    pub printing_time_hours: u64,
    pub printing_time_minutes: u64,
    pub filament_weight_grams: f64,
}

impl From<GcodeEstimate> for AnalysisResponse {
    fn from(estimate: GcodeEstimate) -> Self {
        let (hours, minutes) = split_print_time(estimate.printing_time_seconds);

        Self {
            estimated_print_seconds: estimate.printing_time_seconds,
            estimated_filament_grams: estimate.filament_weight_grams,
            printing_time_hours: hours,
            printing_time_minutes: minutes,
            filament_weight_grams: round_grams(estimate.filament_weight_grams),
        }
    }
}

/// Whole hours and leftover whole minutes. Seconds below a minute are dropped.
pub fn split_print_time(seconds: f64) -> (u64, u64) {
    if !seconds.is_finite() || seconds <= 0.0 {
        return (0, 0);
    }

    let total = seconds.floor() as u64;
    (total / 3600, (total % 3600) / 60)
}

pub fn round_grams(grams: f64) -> f64 {
    if !grams.is_finite() || grams <= 0.0 {
        return 0.0;
    }
    (grams * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_print_time() {
        assert_eq!(split_print_time(9000.0), (2, 30));
        assert_eq!(split_print_time(3599.9), (0, 59));
        assert_eq!(split_print_time(59.0), (0, 0));
        assert_eq!(split_print_time(86_400.0 + 61.0), (24, 1));
    }

    #[test]
    fn test_split_print_time_rejects_garbage() {
        assert_eq!(split_print_time(-120.0), (0, 0));
        assert_eq!(split_print_time(f64::NAN), (0, 0));
        assert_eq!(split_print_time(f64::INFINITY), (0, 0));
    }

    #[test]
    fn test_round_grams() {
        assert_eq!(round_grams(12.3456), 12.35);
        assert_eq!(round_grams(7.0), 7.0);
        assert_eq!(round_grams(-3.0), 0.0);
    }

    #[test]
    fn test_response_from_estimate() {
        let estimate: GcodeEstimate = serde_json::from_str(
            r#"{"printingTimeSeconds": 5430, "filamentWeightGrams": 18.456}"#,
        )
        .unwrap();
        let response = AnalysisResponse::from(estimate);

        assert_eq!(response.printing_time_hours, 1);
        assert_eq!(response.printing_time_minutes, 30);
        assert_eq!(response.filament_weight_grams, 18.46);
        assert_eq!(response.estimated_print_seconds, 5430.0);
    }
}
