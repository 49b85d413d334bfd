//! Lenient deserializers for form values.
//!
//! The UI posts whatever the inputs hold: numbers, numeric strings, empty
//! strings or `null`. Blank and unparseable values become the field default
//! instead of failing the whole request.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reference spool size used when the client omits it.
pub const DEFAULT_SPOOL_WEIGHT_GRAMS: f64 = 1000.0;

/// Currency label used when the client omits it.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Interpret a JSON value as a number. `None` means "absent" (null or blank).
fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<f64>().unwrap_or(0.0))
            }
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Some(0.0),
    }
}

pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0))
}

/// Blank spool weight falls back to the reference spool; an explicit 0 stays 0.
pub fn spool_weight_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match number_from_value(&value) {
        Some(n) if n.is_finite() => n,
        Some(_) => 0.0,
        None => DEFAULT_SPOOL_WEIGHT_GRAMS,
    })
}

pub fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "on" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// Only a non-blank string is a currency label; anything else falls back.
pub fn currency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_CURRENCY.to_string(),
    })
}

pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Record id as text. `null`, blanks and non-scalar values mean "no id".
pub fn id_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// `null` is treated like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
