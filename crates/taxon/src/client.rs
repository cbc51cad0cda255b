//! GBIF species API client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Two calls: backbone name match, and vernacular names for a usage key.

use std::time::Duration;

use serde::Deserialize;

/// Page size for vernacular name lookups. A species rarely has more.
const VERNACULAR_LIMIT: u32 = 100;

/// Error type for GBIF operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxonError {
    /// Transport failure: DNS, connect, TLS, timeout
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Response body was not the expected JSON
    #[error("parse error: {0}")]
    Parse(String),
}

/// GBIF's classification of how a name matched the backbone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Fuzzy,
    HigherRank,
    None,
    Other(String),
}

impl MatchType {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "EXACT" => Self::Exact,
            "FUZZY" => Self::Fuzzy,
            "HIGHERRANK" => Self::HigherRank,
            "NONE" => Self::None,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::Fuzzy => write!(f, "FUZZY"),
            Self::HigherRank => write!(f, "HIGHERRANK"),
            Self::None => write!(f, "NONE"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A conclusive backbone match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub canonical_name: Option<String>,
    pub family: Option<String>,
    pub confidence: Option<u8>,
    pub match_type: MatchType,
    pub usage_key: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VernacularName {
    pub language: Option<String>,
    pub name: String,
}

// Wire shapes. GBIF sends many more fields; only these are read.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    usage_key: Option<u64>,
    canonical_name: Option<String>,
    family: Option<String>,
    confidence: Option<u32>,
    match_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VernacularPage {
    #[serde(default)]
    results: Vec<VernacularEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VernacularEntry {
    vernacular_name: Option<String>,
    language: Option<String>,
}

/// GBIF species API client (blocking).
#[derive(Clone)]
pub struct GbifClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

impl GbifClient {
    /// `api_base` is the species endpoint root, e.g. `https://api.gbif.org/v1/species`.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, TaxonError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("signcheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TaxonError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Best backbone match for a scientific name.
    ///
    /// `Ok(None)` when GBIF reports no conclusive match.
    pub fn match_name(&self, name: &str) -> Result<Option<MatchResult>, TaxonError> {
        let url = format!("{}/match", self.api_base);
        tracing::debug!(%url, name, "GBIF name match");

        let resp = self
            .http
            .get(&url)
            .query(&[("name", name), ("strict", "false"), ("verbose", "true")])
            .send()
            .map_err(|e| TaxonError::Network(e.to_string()))?;
        let resp = check_status(resp)?;
        let body: MatchResponse = resp.json().map_err(|e| TaxonError::Parse(e.to_string()))?;

        let match_type = match body.match_type.as_deref() {
            Some(s) => MatchType::parse(s),
            None => return Ok(None),
        };
        if !match_type.is_conclusive() {
            return Ok(None);
        }

        Ok(Some(MatchResult {
            matched: true,
            canonical_name: body.canonical_name,
            family: body.family,
            confidence: body.confidence.map(|c| c.min(100) as u8),
            match_type,
            usage_key: body.usage_key,
        }))
    }

    /// Vernacular (common) names recorded for a backbone usage key.
    pub fn vernacular_names(&self, usage_key: u64) -> Result<Vec<VernacularName>, TaxonError> {
        let url = format!("{}/{}/vernacularNames", self.api_base, usage_key);
        tracing::debug!(%url, "GBIF vernacular names");

        let resp = self
            .http
            .get(&url)
            .query(&[("limit", VERNACULAR_LIMIT)])
            .send()
            .map_err(|e| TaxonError::Network(e.to_string()))?;
        let resp = check_status(resp)?;
        let page: VernacularPage = resp.json().map_err(|e| TaxonError::Parse(e.to_string()))?;

        Ok(page
            .results
            .into_iter()
            .filter_map(|e| {
                let name = e.vernacular_name?.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                Some(VernacularName { language: e.language, name })
            })
            .collect())
    }
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, TaxonError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(TaxonError::Http(status.as_u16(), snippet))
}

/// Pick the English common name: `eng`/`en` first, then an untagged entry.
pub fn english_common_name(names: &[VernacularName]) -> Option<&str> {
    let english = names.iter().find(|n| {
        n.language
            .as_deref()
            .map(|l| l.trim().eq_ignore_ascii_case("eng") || l.trim().eq_ignore_ascii_case("en"))
            .unwrap_or(false)
    });
    let untagged = || {
        names
            .iter()
            .find(|n| n.language.as_deref().map(|l| l.trim().is_empty()).unwrap_or(true))
    };
    english.or_else(untagged).map(|n| n.name.as_str())
}
