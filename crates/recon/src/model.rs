use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::{CommonNameMode, JoinKey};

/// Rendered in reports wherever the reference had no counterpart.
pub const MISSING_SENTINEL: &str = "Missing from reference";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw table as read from the data store. Cells are text or absent.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default)]
pub struct TableRow {
    /// Storage row handle used for in-place updates (SQLite rowid).
    pub rowid: Option<i64>,
    pub cells: Vec<Option<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// The comparable fields of a species record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ScientificName,
    CommonName,
    Family,
    Origin,
}

impl Field {
    /// Canonical column name, used in reports and summaries.
    pub fn column(&self) -> &'static str {
        match self {
            Self::ScientificName => "scientific_name",
            Self::CommonName => "common_name",
            Self::Family => "family",
            Self::Origin => "origin",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Self::ScientificName => "Scientific name mismatch.",
            Self::CommonName => "Common name mismatch.",
            Self::Family => "Family mismatch.",
            Self::Origin => "Origin mismatch.",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One inventoried item: a sign or a species row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: Option<String>,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub origin: Option<String>,
    #[serde(skip)]
    pub source_row: Option<i64>,
}

impl Record {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::ScientificName => self.scientific_name.as_deref(),
            Field::CommonName => self.common_name.as_deref(),
            Field::Family => self.family.as_deref(),
            Field::Origin => self.origin.as_deref(),
        }
    }

    /// Identifier shown in reports and logs. Falls back to the scientific name.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.scientific_name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// How the external authority matched a reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchInfo {
    pub confidence: Option<u8>,
    pub match_type: String,
}

/// An authoritative counterpart for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub record: Record,
    pub match_info: Option<MatchInfo>,
}

impl From<Record> for ReferenceRecord {
    fn from(record: Record) -> Self {
        Self { record, match_info: None }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A corrected value: either the reference's value or the missing sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Missing,
    Value(String),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_report_str(&self) -> &str {
        match self {
            Self::Missing => MISSING_SENTINEL,
            Self::Value(v) => v,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_report_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    NotFound,
    Mismatch { field: Field, label: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("Not found in reference."),
            Self::Mismatch { label, .. } => f.write_str(label),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectedField {
    pub field: Field,
    pub value: FieldValue,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub subject_id: String,
    pub subject: Record,
    pub reasons: Vec<Reason>,
    pub corrected: Vec<CorrectedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchInfo>,
}

impl Discrepancy {
    pub fn corrected_value(&self, field: Field) -> Option<&FieldValue> {
        self.corrected.iter().find(|c| c.field == field).map(|c| &c.value)
    }

    pub fn is_flagged(&self, field: Field) -> bool {
        self.corrected.iter().any(|c| c.field == field && c.flagged)
    }

    pub fn is_not_found(&self) -> bool {
        self.reasons.contains(&Reason::NotFound)
    }

    /// Reasons joined into one free-text note.
    pub fn note(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub subjects: usize,
    pub consistent: usize,
    pub discrepancies: usize,
    pub not_found: usize,
    pub lookup_failures: usize,
    pub mismatches_by_field: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub discrepancies: Vec<Discrepancy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub run_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinKey>,
    pub common_name_mode: CommonNameMode,
    pub engine_version: String,
    pub run_at: String,
}
