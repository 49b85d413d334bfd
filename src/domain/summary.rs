//! Display helpers: rounding for presentation and the shareable text summary.

use serde::{Deserialize, Serialize};

use super::coerce::string_or_empty;
use super::pricing::{CostBreakdown, JobInputs};

/// Round to cents for display. Never feed the result back into a calculation.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", round_currency(amount), currency)
}

/// Request body for the share summary: the job inputs plus a display name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub job_name: String,
    #[serde(flatten)]
    pub inputs: JobInputs,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub text: String,
    pub breakdown: CostBreakdown,
}

/// Plain-text breakdown suitable for sharing or the clipboard.
pub fn share_summary(job_name: &str, inputs: &JobInputs, breakdown: &CostBreakdown) -> String {
    let currency = inputs.currency_code.as_str();
    let name = match job_name.trim() {
        "" => "Untitled",
        name => name,
    };

    let mut lines = vec![
        format!("3D print job: {}", name),
        "---".to_string(),
        format!("Filament: {}", format_amount(breakdown.filament_cost, currency)),
        format!(
            "Electricity: {}",
            format_amount(breakdown.electricity_cost, currency)
        ),
        format!("Labor: {}", format_amount(breakdown.labor_cost, currency)),
    ];

    if inputs.include_machine_costs {
        lines.push(format!(
            "Machine & maintenance: {}",
            format_amount(breakdown.machine_cost, currency)
        ));
    }

    lines.extend([
        format!(
            "Other costs: {}",
            format_amount(breakdown.other_costs_total, currency)
        ),
        "---".to_string(),
        format!("Sub-total: {}", format_amount(breakdown.sub_total, currency)),
        format!(
            "Profit ({}%): {}",
            inputs.profit_percentage,
            format_amount(breakdown.profit_amount, currency)
        ),
        format!(
            "VAT ({}%): {}",
            inputs.vat_percentage,
            format_amount(breakdown.vat_amount, currency)
        ),
        "---".to_string(),
        format!(
            "Final price: {}",
            format_amount(breakdown.final_price, currency)
        ),
    ]);

    lines.join("\n")
}
