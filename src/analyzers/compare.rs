use crate::analyzers::aggregate::average;
use crate::analyzers::types::{AverageRecord, MergedRecord, Slot, TargetFieldSet};
use crate::error::TableError;
use crate::parser::{Row, TableParser};
use tracing::info;

#[derive(Debug, Clone)]
struct SlotData {
    label: String,
    averages: Vec<AverageRecord>,
}

/// Holds up to two averaged datasets and merges them field by field.
///
/// The field set is fixed when the session is created. Each slot is replaced
/// wholesale; [`ComparisonSession::merged`] is recomputed on every call.
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    fields: TargetFieldSet,
    parser: TableParser,
    first: Option<SlotData>,
    second: Option<SlotData>,
}

impl ComparisonSession {
    pub fn new(fields: TargetFieldSet) -> Self {
        Self {
            fields,
            parser: TableParser::new(),
            first: None,
            second: None,
        }
    }

    pub fn with_parser(mut self, parser: TableParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn fields(&self) -> &TargetFieldSet {
        &self.fields
    }

    /// Replaces the contents of `slot`. The other slot is left alone.
    pub fn set_slot(
        &mut self,
        slot: Slot,
        averages: Vec<AverageRecord>,
        label: impl Into<String>,
    ) {
        let data = SlotData {
            label: label.into(),
            averages,
        };
        info!(slot = %slot, label = %data.label, "Slot updated");
        *self.slot_mut(slot) = Some(data);
    }

    pub fn clear_slot(&mut self, slot: Slot) {
        *self.slot_mut(slot) = None;
    }

    /// Parses `text`, averages it over the session fields and stores the
    /// result in `slot`.
    ///
    /// # Errors
    ///
    /// Returns the parser's [`TableError`]; on error neither slot changes.
    pub fn load(
        &mut self,
        slot: Slot,
        text: &str,
        label: impl Into<String>,
    ) -> Result<(), TableError> {
        let rows = self.parser.parse(text)?;
        self.store_rows(slot, &rows, label);
        Ok(())
    }

    /// Like [`ComparisonSession::load`] for raw file contents that still
    /// need UTF-8 decoding.
    pub fn load_bytes(
        &mut self,
        slot: Slot,
        bytes: &[u8],
        label: impl Into<String>,
    ) -> Result<(), TableError> {
        let rows = self.parser.parse_bytes(bytes)?;
        self.store_rows(slot, &rows, label);
        Ok(())
    }

    fn store_rows(&mut self, slot: Slot, rows: &[Row], label: impl Into<String>) {
        let averages = average(rows, &self.fields);
        self.set_slot(slot, averages, label);
    }

    pub fn is_populated(&self, slot: Slot) -> bool {
        self.slot(slot).is_some()
    }

    pub fn label(&self, slot: Slot) -> Option<&str> {
        self.slot(slot).map(|d| d.label.as_str())
    }

    pub fn averages(&self, slot: Slot) -> Option<&[AverageRecord]> {
        self.slot(slot).map(|d| d.averages.as_slice())
    }

    /// One record per target field, in field order. Absent slots and fields
    /// missing from a slot's averages read as `0`.
    pub fn merged(&self) -> Vec<MergedRecord> {
        self.fields
            .iter()
            .map(|field| MergedRecord {
                field: field.to_string(),
                first: self.value(Slot::First, field),
                second: self.value(Slot::Second, field),
            })
            .collect()
    }

    fn value(&self, slot: Slot, field: &str) -> f64 {
        self.slot(slot)
            .and_then(|d| d.averages.iter().find(|r| r.field == field))
            .map(|r| r.average)
            .unwrap_or(0.0)
    }

    fn slot(&self, slot: Slot) -> Option<&SlotData> {
        match slot {
            Slot::First => self.first.as_ref(),
            Slot::Second => self.second.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<SlotData> {
        match slot {
            Slot::First => &mut self.first,
            Slot::Second => &mut self.second,
        }
    }
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new(TargetFieldSet::seo())
    }
}
