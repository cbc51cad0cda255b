use crate::config::{CommonNameMode, ComparisonSpec, JoinKey};
use crate::evidence::compute_summary;
use crate::model::{
    CorrectedField, Discrepancy, FieldValue, Reason, Record, ReconMeta, ReconResult, ReconSummary,
    ReferenceRecord,
};

/// Outcome of looking up one subject's authoritative counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ReferenceRecord),
    NotFound,
    /// The lookup itself failed (transport, timeout, bad response).
    Failed(String),
}

/// Finds the authoritative counterpart of a subject.
pub trait ReferenceResolver {
    fn resolve(&mut self, subject: &Record) -> Resolution;
}

impl<F> ReferenceResolver for F
where
    F: FnMut(&Record) -> Resolution,
{
    fn resolve(&mut self, subject: &Record) -> Resolution {
        self(subject)
    }
}

#[derive(Debug, Clone)]
pub struct ReconOutcome {
    pub discrepancies: Vec<Discrepancy>,
    pub summary: ReconSummary,
}

/// Compare one subject against its reference (if any).
///
/// Returns `None` when every comparison matches.
pub fn check_subject(
    subject: &Record,
    reference: Option<&ReferenceRecord>,
    spec: &ComparisonSpec,
) -> Option<Discrepancy> {
    let fields = spec.output_fields();

    let Some(reference) = reference else {
        return Some(Discrepancy {
            subject_id: subject.label().to_string(),
            subject: subject.clone(),
            reasons: vec![Reason::NotFound],
            corrected: fields
                .into_iter()
                .map(|field| CorrectedField { field, value: FieldValue::Missing, flagged: false })
                .collect(),
            match_info: None,
        });
    };

    let mut reasons = Vec::new();
    for cmp in &spec.comparisons {
        if cmp.differs(subject.get(cmp.field), reference.record.get(cmp.field)) {
            reasons.push(Reason::Mismatch { field: cmp.field, label: cmp.label.clone() });
        }
    }

    if reasons.is_empty() {
        return None;
    }

    let corrected = fields
        .into_iter()
        .map(|field| CorrectedField {
            field,
            value: FieldValue::Value(reference.record.get(field).unwrap_or("").to_string()),
            flagged: reasons
                .iter()
                .any(|r| matches!(r, Reason::Mismatch { field: f, .. } if *f == field)),
        })
        .collect();

    Some(Discrepancy {
        subject_id: subject.label().to_string(),
        subject: subject.clone(),
        reasons,
        corrected,
        match_info: reference.match_info.clone(),
    })
}

/// Reconcile every subject in order. Lookup failures are logged and count as
/// "not found" for that subject only.
pub fn reconcile<R>(subjects: &[Record], resolver: &mut R, spec: &ComparisonSpec) -> ReconOutcome
where
    R: ReferenceResolver + ?Sized,
{
    let mut discrepancies = Vec::new();
    let mut lookup_failures = 0;

    for subject in subjects {
        let reference = match resolver.resolve(subject) {
            Resolution::Found(r) => Some(r),
            Resolution::NotFound => None,
            Resolution::Failed(msg) => {
                tracing::warn!(subject = subject.label(), error = %msg, "reference lookup failed");
                lookup_failures += 1;
                None
            }
        };

        if let Some(d) = check_subject(subject, reference.as_ref(), spec) {
            discrepancies.push(d);
        }
    }

    let summary = compute_summary(subjects.len(), &discrepancies, lookup_failures);
    ReconOutcome { discrepancies, summary }
}

/// Run one reconciliation and stamp it with run metadata.
pub fn run<R>(
    run_name: &str,
    join: Option<JoinKey>,
    common_name_mode: CommonNameMode,
    subjects: &[Record],
    resolver: &mut R,
    spec: &ComparisonSpec,
) -> ReconResult
where
    R: ReferenceResolver + ?Sized,
{
    let outcome = reconcile(subjects, resolver, spec);
    tracing::info!(
        subjects = outcome.summary.subjects,
        discrepancies = outcome.summary.discrepancies,
        "reconciliation finished"
    );

    ReconResult {
        meta: ReconMeta {
            run_name: run_name.to_string(),
            join,
            common_name_mode,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: outcome.summary,
        discrepancies: outcome.discrepancies,
    }
}
