//! GBIF species API client and name-match resolver.
//!
//! No retries. No progress bars. One blocking request at a time.

mod client;
mod resolver;

pub use client::{english_common_name, GbifClient, MatchResult, MatchType, TaxonError, VernacularName};
pub use resolver::{GbifResolver, DEFAULT_DELAY};
