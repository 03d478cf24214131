//! Delimited-text parser for SEO metric exports.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::TableError;

/// One record of the input table, keyed by column header.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    line: u64,
    values: HashMap<String, String>,
}

impl Row {
    /// Returns the raw value for `field`, or `None` if the column does not exist.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// 1-based line in the source text where this record starts.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns raw delimited text into [`Row`]s.
#[derive(Debug, Clone)]
pub struct TableParser {
    delimiter: u8,
}

impl Default for TableParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TableParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Decodes `bytes` as UTF-8 and parses them.
    ///
    /// # Errors
    ///
    /// [`TableError::MalformedInput`] if the bytes are not valid UTF-8, plus
    /// everything [`TableParser::parse`] can return.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<Row>, TableError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            TableError::malformed(format!("input is not valid UTF-8: {e}"))
        })?;
        self.parse(text)
    }

    /// Parses `text` into rows, preserving file order.
    ///
    /// The first non-blank line is the header. Short rows yield empty values
    /// for the missing columns; values beyond the header width are dropped.
    ///
    /// # Errors
    ///
    /// - [`TableError::MalformedInput`] if there is no header line or the
    ///   tokenizer fails.
    /// - [`TableError::DuplicateHeader`] if two columns share a name.
    pub fn parse(&self, text: &str) -> Result<Vec<Row>, TableError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| TableError::malformed(format!("failed to read header line: {e}")))?
            .clone();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(TableError::malformed("missing header line"));
        }
        check_unique(&headers)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                TableError::malformed(format!("failed to tokenize record {}: {e}", rows.len() + 1))
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() > headers.len() {
                debug!(
                    line,
                    extra = record.len() - headers.len(),
                    "Ignoring values beyond header width"
                );
            }

            let values = headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), record.get(i).unwrap_or("").to_string()))
                .collect();

            rows.push(Row { line, values });
        }

        debug!(columns = headers.len(), rows = rows.len(), "Table parsed");
        Ok(rows)
    }
}

fn check_unique(headers: &StringRecord) -> Result<(), TableError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        if let Some(first) = seen.insert(name, i + 1) {
            return Err(TableError::DuplicateHeader {
                name: name.to_string(),
                first,
                second: i + 1,
            });
        }
    }
    Ok(())
}
