//! Print job pricing engine.
//!
//! Turns the raw parameters of a job into a cost breakdown in three stages:
//! time normalization, independent cost components, then aggregation with
//! profit markup followed by VAT. The computation is pure: no rounding, no
//! clock, no shared state. Rounding is left to display code.
//!
//! Inputs are expected to be validated (non-negative) before they get here.
//! Negative values are not clamped; they flow through the arithmetic as is.

use serde::{Deserialize, Serialize};

use super::coerce::{
    currency_or_default, flag_or_false, null_as_default, number_or_zero, spool_weight_or_default,
    string_or_empty, DEFAULT_CURRENCY, DEFAULT_SPOOL_WEIGHT_GRAMS,
};

/// Operating hours per day assumed by the machine amortization model.
pub const AMORTIZATION_HOURS_PER_DAY: f64 = 8.0;

/// Operating days per year assumed by the machine amortization model.
pub const AMORTIZATION_DAYS_PER_YEAR: f64 = 365.0;

/// A free-form extra cost (screws, magnets, packaging...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherCostLine {
    #[serde(deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "number_or_zero")]
    pub price: f64,
}

#[cfg(test)]
impl OtherCostLine {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Everything the engine needs to price one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobInputs {
    #[serde(deserialize_with = "number_or_zero")]
    pub printing_time_hours: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub printing_time_minutes: f64,

    #[serde(deserialize_with = "number_or_zero")]
    pub filament_weight_grams: f64,
    #[serde(deserialize_with = "spool_weight_or_default")]
    pub spool_weight_grams: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub spool_price: f64,

    #[serde(deserialize_with = "number_or_zero")]
    pub power_consumption_watts: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub energy_cost_per_kwh: f64,

    #[serde(deserialize_with = "number_or_zero")]
    pub prep_time_minutes: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub prep_cost_per_hour: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub post_processing_time_hours: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub post_processing_time_minutes: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub post_processing_cost_per_hour: f64,

    #[serde(deserialize_with = "flag_or_false")]
    pub include_machine_costs: bool,
    #[serde(deserialize_with = "number_or_zero")]
    pub printer_cost: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub investment_return_years: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub repair_cost: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub other_cost_lines: Vec<OtherCostLine>,

    #[serde(deserialize_with = "number_or_zero")]
    pub profit_percentage: f64,
    #[serde(deserialize_with = "number_or_zero")]
    pub vat_percentage: f64,

    /// Display label only, never converted.
    #[serde(deserialize_with = "currency_or_default")]
    pub currency_code: String,
}

impl Default for JobInputs {
    fn default() -> Self {
        Self {
            printing_time_hours: 0.0,
            printing_time_minutes: 0.0,
            filament_weight_grams: 0.0,
            spool_weight_grams: DEFAULT_SPOOL_WEIGHT_GRAMS,
            spool_price: 0.0,
            power_consumption_watts: 0.0,
            energy_cost_per_kwh: 0.0,
            prep_time_minutes: 0.0,
            prep_cost_per_hour: 0.0,
            post_processing_time_hours: 0.0,
            post_processing_time_minutes: 0.0,
            post_processing_cost_per_hour: 0.0,
            include_machine_costs: false,
            printer_cost: 0.0,
            investment_return_years: 0.0,
            repair_cost: 0.0,
            other_cost_lines: Vec::new(),
            profit_percentage: 0.0,
            vat_percentage: 0.0,
            currency_code: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl JobInputs {
    pub fn total_printing_hours(&self) -> f64 {
        self.printing_time_hours + self.printing_time_minutes / 60.0
    }

    /// Hours and minutes are summed in minutes first.
    pub fn total_post_processing_hours(&self) -> f64 {
        (self.post_processing_time_hours * 60.0 + self.post_processing_time_minutes) / 60.0
    }
}

/// Derived monetary figures for one job, in the job's currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub filament_cost: f64,
    pub electricity_cost: f64,
    pub labor_cost: f64,
    pub machine_cost: f64,
    pub other_costs_total: f64,
    pub sub_total: f64,
    pub profit_amount: f64,
    pub price_before_vat: f64,
    pub vat_amount: f64,
    pub final_price: f64,
}

/// Price a job.
pub fn calculate(inputs: &JobInputs) -> CostBreakdown {
    let printing_hours = inputs.total_printing_hours();
    let post_processing_hours = inputs.total_post_processing_hours();

    let filament_cost = filament_cost(inputs);
    let electricity_cost = electricity_cost(inputs, printing_hours);

    let prep_cost = (inputs.prep_time_minutes / 60.0) * inputs.prep_cost_per_hour;
    let post_processing_cost = post_processing_hours * inputs.post_processing_cost_per_hour;
    let labor_cost = prep_cost + post_processing_cost;

    let machine_cost = machine_cost(inputs, printing_hours);
    let other_costs_total = inputs
        .other_cost_lines
        .iter()
        .map(|line| line.price)
        .sum::<f64>();

    let sub_total =
        filament_cost + electricity_cost + labor_cost + machine_cost + other_costs_total;
    let profit_amount = sub_total * (inputs.profit_percentage / 100.0);
    let price_before_vat = sub_total + profit_amount;
    let vat_amount = price_before_vat * (inputs.vat_percentage / 100.0);
    let final_price = price_before_vat + vat_amount;

    CostBreakdown {
        filament_cost,
        electricity_cost,
        labor_cost,
        machine_cost,
        other_costs_total,
        sub_total,
        profit_amount,
        price_before_vat,
        vat_amount,
        final_price,
    }
}

fn filament_cost(inputs: &JobInputs) -> f64 {
    if inputs.spool_weight_grams > 0.0 {
        (inputs.filament_weight_grams / inputs.spool_weight_grams) * inputs.spool_price
    } else {
        0.0
    }
}

/// Exactly zero unless time, draw and tariff are all strictly positive.
fn electricity_cost(inputs: &JobInputs, printing_hours: f64) -> f64 {
    if printing_hours > 0.0 && inputs.power_consumption_watts > 0.0 && inputs.energy_cost_per_kwh > 0.0
    {
        (inputs.power_consumption_watts / 1000.0) * printing_hours * inputs.energy_cost_per_kwh
    } else {
        0.0
    }
}

/// Printer amortization over its working life plus the flat repair add-on.
///
/// The working life is `investment_return_years` of 365 days at 8 operating
/// hours a day; the job is charged for the hours it occupies the printer.
fn machine_cost(inputs: &JobInputs, printing_hours: f64) -> f64 {
    if !inputs.include_machine_costs {
        return 0.0;
    }

    let amortization = if inputs.investment_return_years > 0.0 && inputs.printer_cost > 0.0 {
        let lifetime_hours = inputs.investment_return_years
            * AMORTIZATION_DAYS_PER_YEAR
            * AMORTIZATION_HOURS_PER_DAY;
        (inputs.printer_cost / lifetime_hours) * printing_hours
    } else {
        0.0
    };

    amortization + inputs.repair_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn scenario_a() -> JobInputs {
        JobInputs {
            printing_time_hours: 2.0,
            printing_time_minutes: 30.0,
            filament_weight_grams: 50.0,
            spool_weight_grams: 1000.0,
            spool_price: 20.0,
            power_consumption_watts: 150.0,
            energy_cost_per_kwh: 0.15,
            prep_time_minutes: 10.0,
            prep_cost_per_hour: 30.0,
            post_processing_time_minutes: 0.0,
            post_processing_cost_per_hour: 30.0,
            include_machine_costs: false,
            profit_percentage: 20.0,
            vat_percentage: 21.0,
            ..JobInputs::default()
        }
    }

    #[test]
    fn test_scenario_a_full_breakdown() {
        let b = calculate(&scenario_a());

        assert_close(b.filament_cost, 1.0);
        assert_close(b.electricity_cost, 0.05625);
        assert_close(b.labor_cost, 5.0);
        assert_close(b.machine_cost, 0.0);
        assert_close(b.other_costs_total, 0.0);
        assert_close(b.sub_total, 6.05625);
        assert_close(b.profit_amount, 1.21125);
        assert_close(b.price_before_vat, 7.2675);
        assert_close(b.vat_amount, 1.526175);
        assert_close(b.final_price, 8.793675);
    }

    #[test]
    fn test_scenario_b_machine_amortization() {
        let inputs = JobInputs {
            printing_time_hours: 4.0,
            include_machine_costs: true,
            printer_cost: 500.0,
            investment_return_years: 2.0,
            repair_cost: 1.0,
            ..JobInputs::default()
        };

        let b = calculate(&inputs);
        let amortization = 500.0 / (2.0 * 365.0 * 8.0) * 4.0;
        assert_close(b.machine_cost, amortization + 1.0);
        assert!((b.machine_cost - 1.342466).abs() < 1e-6);
    }

    #[test]
    fn test_scenario_c_other_costs_ignore_order() {
        let mut inputs = JobInputs {
            other_cost_lines: vec![
                OtherCostLine::new("Screws", 2.5),
                OtherCostLine::new("Magnets", 3.0),
            ],
            ..JobInputs::default()
        };
        assert_close(calculate(&inputs).other_costs_total, 5.5);

        inputs.other_cost_lines.reverse();
        assert_close(calculate(&inputs).other_costs_total, 5.5);
    }

    #[test]
    fn test_filament_cost_is_linear() {
        let base = JobInputs {
            filament_weight_grams: 40.0,
            spool_weight_grams: 800.0,
            spool_price: 16.0,
            ..JobInputs::default()
        };
        let single = calculate(&base).filament_cost;
        assert_close(single, 40.0 / 800.0 * 16.0);

        let double_weight = JobInputs {
            filament_weight_grams: 80.0,
            ..base.clone()
        };
        assert_close(calculate(&double_weight).filament_cost, single * 2.0);

        let triple_price = JobInputs {
            spool_price: 48.0,
            ..base
        };
        assert_close(calculate(&triple_price).filament_cost, single * 3.0);
    }

    #[test]
    fn test_zero_spool_weight_yields_zero_filament_cost() {
        let inputs = JobInputs {
            filament_weight_grams: 50.0,
            spool_weight_grams: 0.0,
            spool_price: 20.0,
            ..JobInputs::default()
        };
        assert_eq!(calculate(&inputs).filament_cost, 0.0);
    }

    #[test]
    fn test_machine_costs_ignored_when_disabled() {
        let inputs = JobInputs {
            printing_time_hours: 10.0,
            include_machine_costs: false,
            printer_cost: 1200.0,
            investment_return_years: 1.0,
            repair_cost: 15.0,
            ..JobInputs::default()
        };
        assert_eq!(calculate(&inputs).machine_cost, 0.0);
    }

    #[test]
    fn test_machine_costs_without_horizon_only_charge_repair() {
        let inputs = JobInputs {
            printing_time_hours: 3.0,
            include_machine_costs: true,
            printer_cost: 800.0,
            investment_return_years: 0.0,
            repair_cost: 2.0,
            ..JobInputs::default()
        };
        assert_eq!(calculate(&inputs).machine_cost, 2.0);
    }

    #[test]
    fn test_electricity_short_circuits_on_any_zero_factor() {
        let base = scenario_a();

        let no_power = JobInputs {
            power_consumption_watts: 0.0,
            ..base.clone()
        };
        let no_tariff = JobInputs {
            energy_cost_per_kwh: 0.0,
            ..base.clone()
        };
        let no_time = JobInputs {
            printing_time_hours: 0.0,
            printing_time_minutes: 0.0,
            ..base
        };

        assert_eq!(calculate(&no_power).electricity_cost, 0.0);
        assert_eq!(calculate(&no_tariff).electricity_cost, 0.0);
        assert_eq!(calculate(&no_time).electricity_cost, 0.0);
    }

    #[test]
    fn test_post_processing_hours_and_minutes_are_summed() {
        let inputs = JobInputs {
            post_processing_time_hours: 1.0,
            post_processing_time_minutes: 30.0,
            post_processing_cost_per_hour: 20.0,
            ..JobInputs::default()
        };
        assert_close(inputs.total_post_processing_hours(), 1.5);
        assert_close(calculate(&inputs).labor_cost, 30.0);
    }

    #[test]
    fn test_final_price_monotonic_in_profit() {
        let mut inputs = scenario_a();
        let mut previous = calculate(&inputs).final_price;

        for profit in [25.0, 40.0, 100.0, 250.0] {
            inputs.profit_percentage = profit;
            let current = calculate(&inputs).final_price;
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_final_price_monotonic_in_cost_inputs() {
        let base = calculate(&scenario_a()).final_price;

        let more_filament = JobInputs {
            filament_weight_grams: 120.0,
            ..scenario_a()
        };
        let more_prep = JobInputs {
            prep_time_minutes: 45.0,
            ..scenario_a()
        };
        let more_vat = JobInputs {
            vat_percentage: 30.0,
            ..scenario_a()
        };

        assert!(calculate(&more_filament).final_price >= base);
        assert!(calculate(&more_prep).final_price >= base);
        assert!(calculate(&more_vat).final_price >= base);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let inputs = JobInputs {
            include_machine_costs: true,
            printer_cost: 349.99,
            investment_return_years: 3.0,
            repair_cost: 0.35,
            other_cost_lines: vec![OtherCostLine::new("Box", 1.2)],
            ..scenario_a()
        };

        let first = calculate(&inputs);
        let second = calculate(&inputs);
        assert_eq!(first.final_price.to_bits(), second.final_price.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_aggregation_invariants_hold() {
        let inputs = JobInputs {
            include_machine_costs: true,
            printer_cost: 600.0,
            investment_return_years: 2.5,
            repair_cost: 0.8,
            other_cost_lines: vec![OtherCostLine::new("Insert", 0.6)],
            ..scenario_a()
        };
        let b = calculate(&inputs);

        assert_close(
            b.sub_total,
            b.filament_cost + b.electricity_cost + b.labor_cost + b.machine_cost + b.other_costs_total,
        );
        assert_close(b.price_before_vat, b.sub_total + b.profit_amount);
        assert_close(b.final_price, b.price_before_vat + b.vat_amount);
    }

    #[test]
    fn test_deserialize_defaults_missing_fields() {
        let inputs: JobInputs = serde_json::from_str(r#"{"printingTimeHours": "1"}"#).unwrap();

        assert_eq!(inputs.printing_time_hours, 1.0);
        assert_eq!(inputs.spool_weight_grams, 1000.0);
        assert_eq!(inputs.currency_code, "EUR");
        assert!(inputs.other_cost_lines.is_empty());
        assert!(!inputs.include_machine_costs);
    }

    #[test]
    fn test_deserialize_other_cost_with_bad_price() {
        let inputs: JobInputs = serde_json::from_str(
            r#"{"otherCostLines": [{"name": "Glue", "price": "n/a"}, {"name": "Tape"}, {"name": "Bag", "price": "1.5"}]}"#,
        )
        .unwrap();

        assert_eq!(inputs.other_cost_lines.len(), 3);
        assert_close(calculate(&inputs).other_costs_total, 1.5);
    }
}
