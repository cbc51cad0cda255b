use std::collections::BTreeMap;

use crate::model::{Discrepancy, Reason, ReconSummary};

/// Compute summary statistics from the discrepancies of one run.
pub fn compute_summary(subjects: usize, discrepancies: &[Discrepancy], lookup_failures: usize) -> ReconSummary {
    let mut mismatches_by_field: BTreeMap<String, usize> = BTreeMap::new();
    let mut not_found = 0;

    for d in discrepancies {
        for reason in &d.reasons {
            match reason {
                Reason::NotFound => not_found += 1,
                Reason::Mismatch { field, .. } => {
                    *mismatches_by_field.entry(field.column().to_string()).or_insert(0) += 1;
                }
            }
        }
    }

    ReconSummary {
        subjects,
        consistent: subjects.saturating_sub(discrepancies.len()),
        discrepancies: discrepancies.len(),
        not_found,
        lookup_failures,
        mismatches_by_field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, Record};

    fn discrepancy(reasons: Vec<Reason>) -> Discrepancy {
        Discrepancy {
            subject_id: "k".into(),
            subject: Record::default(),
            reasons,
            corrected: vec![],
            match_info: None,
        }
    }

    fn mismatch(field: Field) -> Reason {
        Reason::Mismatch { field, label: field.default_label().into() }
    }

    #[test]
    fn summary_counts() {
        let ds = vec![
            discrepancy(vec![Reason::NotFound]),
            discrepancy(vec![mismatch(Field::ScientificName), mismatch(Field::Family)]),
            discrepancy(vec![mismatch(Field::Family)]),
        ];
        let summary = compute_summary(10, &ds, 1);
        assert_eq!(summary.subjects, 10);
        assert_eq!(summary.consistent, 7);
        assert_eq!(summary.discrepancies, 3);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.lookup_failures, 1);
        assert_eq!(summary.mismatches_by_field["family"], 2);
        assert_eq!(summary.mismatches_by_field["scientific_name"], 1);
        assert!(!summary.mismatches_by_field.contains_key("common_name"));
    }

    #[test]
    fn empty_run() {
        let summary = compute_summary(0, &[], 0);
        assert_eq!(summary, ReconSummary::default());
    }
}
