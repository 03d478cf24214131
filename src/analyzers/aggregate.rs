use crate::analyzers::types::{AverageRecord, TargetFieldSet};
use crate::parser::Row;
use bigdecimal::{BigDecimal, RoundingMode};
use tracing::debug;

/// Magnitude from which every `f64` is an integer (2^53).
const INTEGRAL_FROM: f64 = 9_007_199_254_740_992.0;

/// Computes one rounded average per target field, in field-set order.
///
/// Each row contributes its value parsed as `f64`; a missing, empty,
/// non-numeric or non-finite value contributes `0` so that every row always
/// counts towards the denominator. With no rows every average is `0`.
pub fn average(rows: &[Row], fields: &TargetFieldSet) -> Vec<AverageRecord> {
    fields
        .iter()
        .map(|field| {
            let values: Vec<f64> = rows
                .iter()
                .map(|row| numeric_value(row.get(field)))
                .collect();

            let avg = round2(mean(&values));
            debug!(field, rows = rows.len(), average = avg, "Field averaged");

            AverageRecord {
                field: field.to_string(),
                average: avg,
            }
        })
        .collect()
}

/// Coerces a raw cell into a number, falling back to `0`.
pub fn numeric_value(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
///
/// Falls back to summing `value / n` when the plain sum overflows.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

/// Rounds to two decimals, half away from zero, from the exact decimal
/// expansion of `value`.
///
/// `0.015` is stored as `0.01499…` and rounds to `0.01`; `0.125` is an exact
/// tie and rounds to `0.13`. Non-finite values and values too large to carry
/// a fraction are returned unchanged.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= INTEGRAL_FROM {
        return value;
    }
    let Ok(exact) = BigDecimal::try_from(value) else {
        return value;
    };
    exact
        .with_scale_round(2, RoundingMode::HalfUp)
        .to_string()
        .parse()
        .unwrap_or(value)
}
