//! Data types used by the averaging and comparison pipeline.

use std::fmt;

use serde::Serialize;

/// Metrics written by the scraping service for every analyzed page.
pub const SEO_FIELDS: &[&str] = &[
    "lunghezza title",
    "lunghezza description",
    "tot h1",
    "tot h2",
    "tot h3",
    "tot h4",
    "tot h5",
    "tot h6",
    "total_words",
    "keyword_count",
    "keyword_density",
];

/// Ordered list of the fields averaged and compared in a session.
///
/// The order is the display and merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFieldSet {
    fields: Vec<String>,
}

impl TargetFieldSet {
    /// Builds a set from `fields`, dropping repeated names after their first
    /// occurrence.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !out.contains(&field) {
                out.push(field);
            }
        }
        Self { fields: out }
    }

    /// The standard SEO metric set, see [`SEO_FIELDS`].
    pub fn seo() -> Self {
        Self::new(SEO_FIELDS.iter().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for TargetFieldSet {
    fn default() -> Self {
        Self::seo()
    }
}

/// Average of one field over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRecord {
    pub field: String,
    pub average: f64,
}

/// One of the two dataset positions being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::First => "first",
            Slot::Second => "second",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field pair of values, one per slot, ready for side-by-side rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub field: String,
    pub first: f64,
    pub second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seo_set_order() {
        let set = TargetFieldSet::seo();
        let fields: Vec<_> = set.iter().collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(fields[0], "lunghezza title");
        assert_eq!(fields[2], "tot h1");
        assert_eq!(fields[10], "keyword_density");
    }

    #[test]
    fn test_repeated_fields_are_dropped() {
        let set = TargetFieldSet::new(["tot h1", "tot h2", "tot h1"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["tot h1", "tot h2"]);
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(Slot::First.to_string(), "first");
        assert_eq!(Slot::Second.as_str(), "second");
    }
}
