//! Report rows built from discrepancies.
//!
//! Column order is fixed by struct field order; the CSV writer serializes
//! them as-is.

use serde::Serialize;

use crate::model::{Discrepancy, Field, MISSING_SENTINEL};

/// One line of the sign order list: the values a replacement sign should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignOrderRow {
    pub tree_id: String,
    pub scientific_name: String,
    pub common_name: String,
    pub family: String,
    pub origin: String,
    pub note: String,
}

/// One line of the taxonomy discrepancy report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyRow {
    pub original_common_name: String,
    pub original_scientific_name: String,
    pub gbif_scientific_name: String,
    pub original_family: String,
    pub gbif_family: String,
    pub gbif_common_name: String,
    pub gbif_match_confidence: String,
    pub gbif_match_type: String,
    pub note: String,
}

/// In-place status change for one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub rowid: i64,
    pub subject_id: String,
    pub status: String,
    pub note: String,
}

fn corrected(d: &Discrepancy, field: Field) -> String {
    match d.corrected_value(field) {
        Some(v) => v.as_report_str().to_string(),
        None if d.is_not_found() => MISSING_SENTINEL.to_string(),
        None => String::new(),
    }
}

pub fn sign_order_rows(discrepancies: &[Discrepancy]) -> Vec<SignOrderRow> {
    discrepancies
        .iter()
        .map(|d| SignOrderRow {
            tree_id: d.subject.id.clone().unwrap_or_default(),
            scientific_name: corrected(d, Field::ScientificName),
            common_name: corrected(d, Field::CommonName),
            family: corrected(d, Field::Family),
            origin: corrected(d, Field::Origin),
            note: d.note(),
        })
        .collect()
}

pub fn taxonomy_rows(discrepancies: &[Discrepancy]) -> Vec<TaxonomyRow> {
    discrepancies
        .iter()
        .map(|d| {
            let original = |field: Field| d.subject.get(field).unwrap_or("").to_string();
            let (confidence, match_type) = match &d.match_info {
                Some(m) => (
                    m.confidence.map(|c| c.to_string()).unwrap_or_default(),
                    m.match_type.clone(),
                ),
                None => (String::new(), String::new()),
            };
            TaxonomyRow {
                original_common_name: original(Field::CommonName),
                original_scientific_name: original(Field::ScientificName),
                gbif_scientific_name: corrected(d, Field::ScientificName),
                original_family: original(Field::Family),
                gbif_family: corrected(d, Field::Family),
                gbif_common_name: corrected(d, Field::CommonName),
                gbif_match_confidence: confidence,
                gbif_match_type: match_type,
                note: d.note(),
            }
        })
        .collect()
}

/// Status updates for discrepancies whose subject came from a writable row.
pub fn status_updates(discrepancies: &[Discrepancy], status: &str) -> Vec<StatusUpdate> {
    discrepancies
        .iter()
        .filter_map(|d| {
            d.subject.source_row.map(|rowid| StatusUpdate {
                rowid,
                subject_id: d.subject_id.clone(),
                status: status.to_string(),
                note: d.note(),
            })
        })
        .collect()
}
