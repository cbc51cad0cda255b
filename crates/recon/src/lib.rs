//! `signcheck-recon`: species record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns discrepancies.
//! No CLI, HTTP or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod load;
pub mod model;
pub mod report;

pub use config::{CommonNameMode, ComparisonMode, JoinKey, ReconConfig};
pub use engine::{check_subject, reconcile, run, ReconOutcome, ReferenceResolver, Resolution};
pub use error::ReconError;
pub use index::MasterIndex;
pub use model::{Discrepancy, Field, FieldValue, Record, ReconResult, ReferenceRecord, Table};
