//! Output formatting and persistence for merged comparison series.
//!
//! Supports a logged table, pretty-printed JSON, and CSV export.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::MergedRecord;
use csv::WriterBuilder;
use std::io::Write;

/// JSON document describing one comparison.
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub first_label: Option<&'a str>,
    pub second_label: Option<&'a str>,
    pub fields: &'a [MergedRecord],
}

impl<'a> ComparisonReport<'a> {
    pub fn new(
        first_label: Option<&'a str>,
        second_label: Option<&'a str>,
        fields: &'a [MergedRecord],
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            first_label,
            second_label,
            fields,
        }
    }
}

/// Logs the series using Rust's debug pretty-print format.
pub fn print_pretty(series: &[MergedRecord]) {
    debug!("{:#?}", series);
}

/// Logs one line per field with both values.
pub fn print_table(report: &ComparisonReport<'_>) {
    let first = report.first_label.unwrap_or("first");
    let second = report.second_label.unwrap_or("second");
    for record in report.fields {
        info!(
            field = %record.field,
            first = record.first,
            second = record.second,
            "{first} vs {second}"
        );
    }
}

/// Serializes the report as pretty-printed JSON.
pub fn to_json(report: &ComparisonReport<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the series as CSV with a `field,<first>,<second>` header.
pub fn write_csv<W: Write>(writer: W, report: &ComparisonReport<'_>) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record([
        "field",
        report.first_label.unwrap_or("first"),
        report.second_label.unwrap_or("second"),
    ])?;
    for record in report.fields {
        writer.write_record([
            record.field.clone(),
            format!("{:.2}", record.first),
            format!("{:.2}", record.second),
        ])?;
    }
    writer.flush()?;

    Ok(())
}
