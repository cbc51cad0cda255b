use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::Field;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// How subjects are joined to the species master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKey {
    #[default]
    TreeId,
    ScientificName,
}

impl std::fmt::Display for JoinKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TreeId => write!(f, "tree_id"),
            Self::ScientificName => write!(f, "scientific_name"),
        }
    }
}

/// Whether the common name takes part in the comparison or is only carried
/// into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonNameMode {
    #[default]
    Compare,
    Report,
}

impl std::fmt::Display for CommonNameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compare => write!(f, "compare"),
            Self::Report => write!(f, "report"),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Trim surrounding whitespace, lowercase.
    #[default]
    TrimLowercase,
    /// As `TrimLowercase`, and collapse inner whitespace runs to one space.
    CollapseWhitespace,
}

impl Normalization {
    /// Absent values normalize to the empty string.
    pub fn apply(&self, value: Option<&str>) -> String {
        let value = value.unwrap_or("").trim().to_lowercase();
        match self {
            Self::TrimLowercase => value,
            Self::CollapseWhitespace => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankPolicy {
    /// Blank compares as the empty string.
    #[default]
    Compare,
    /// No mismatch when either side is blank. The taxonomy run uses this, so
    /// a blank family or name is never flagged there.
    SkipIfBlank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: Field,
    pub normalization: Normalization,
    pub blank_policy: BlankPolicy,
    pub label: String,
}

impl Comparison {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            normalization: Normalization::default(),
            blank_policy: BlankPolicy::default(),
            label: field.default_label().to_string(),
        }
    }

    pub fn blank_policy(mut self, policy: BlankPolicy) -> Self {
        self.blank_policy = policy;
        self
    }

    /// True when the two values differ under this comparison's rules.
    pub fn differs(&self, subject: Option<&str>, reference: Option<&str>) -> bool {
        let left = self.normalization.apply(subject);
        let right = self.normalization.apply(reference);
        if self.blank_policy == BlankPolicy::SkipIfBlank && (left.is_empty() || right.is_empty()) {
            return false;
        }
        left != right
    }
}

/// Ordered comparisons plus fields that are copied into the report unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonSpec {
    pub comparisons: Vec<Comparison>,
    pub carried: Vec<Field>,
}

impl ComparisonSpec {
    /// Every field that appears in a discrepancy's corrected values, in order.
    pub fn output_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.comparisons.iter().map(|c| c.field).collect();
        for field in &self.carried {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
        fields
    }
}

/// Everything that decides which fields are compared for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonMode {
    pub common_name: CommonNameMode,
    pub blank_policy: BlankPolicy,
    pub carry_origin: bool,
}

impl ComparisonMode {
    /// Sign inventory against the species master.
    pub fn signs(common_name: CommonNameMode) -> Self {
        Self {
            common_name,
            blank_policy: BlankPolicy::Compare,
            carry_origin: true,
        }
    }

    /// Species list against the external taxonomic authority.
    pub fn taxonomy(common_name: CommonNameMode) -> Self {
        Self {
            common_name,
            blank_policy: BlankPolicy::SkipIfBlank,
            carry_origin: false,
        }
    }

    pub fn build(&self) -> ComparisonSpec {
        let mut comparisons = vec![Comparison::new(Field::ScientificName).blank_policy(self.blank_policy)];
        let mut carried = Vec::new();
        match self.common_name {
            CommonNameMode::Compare => {
                comparisons.push(Comparison::new(Field::CommonName).blank_policy(self.blank_policy))
            }
            CommonNameMode::Report => carried.push(Field::CommonName),
        }
        comparisons.push(Comparison::new(Field::Family).blank_policy(self.blank_policy));
        if self.carry_origin {
            carried.push(Field::Origin);
        }
        ComparisonSpec { comparisons, carried }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub id: Option<String>,
    pub scientific_name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    pub family: String,
    #[serde(default)]
    pub origin: Option<String>,
}

impl ColumnMapping {
    pub fn sign_inventory() -> Self {
        Self {
            id: Some("tree_id".into()),
            scientific_name: "sign_scientific_name".into(),
            common_name: Some("sign_common_name".into()),
            family: "sign_family".into(),
            origin: None,
        }
    }

    pub fn species_master() -> Self {
        Self {
            id: Some("tree_id".into()),
            scientific_name: "scientific_name".into(),
            common_name: Some("common_name".into()),
            family: "family".into(),
            origin: Some("origin".into()),
        }
    }

    pub fn species_list() -> Self {
        Self {
            id: None,
            scientific_name: "scientific_name".into(),
            common_name: Some("common_name".into()),
            family: "family".into(),
            origin: None,
        }
    }

    /// All mapped column names, in field order.
    pub fn columns(&self) -> Vec<&str> {
        let mut cols = Vec::with_capacity(5);
        if let Some(ref id) = self.id {
            cols.push(id.as_str());
        }
        cols.push(self.scientific_name.as_str());
        if let Some(ref c) = self.common_name {
            cols.push(c.as_str());
        }
        cols.push(self.family.as_str());
        if let Some(ref o) = self.origin {
            cols.push(o.as_str());
        }
        cols
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration, usually read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub signs: SignsConfig,
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignsConfig {
    pub table: String,
    pub master_table: String,
    pub join: JoinKey,
    pub common_name: CommonNameMode,
    pub output: String,
    pub status_column: String,
    pub notes_column: String,
    pub status_value: String,
    pub columns: ColumnMapping,
    pub master_columns: ColumnMapping,
}

impl Default for SignsConfig {
    fn default() -> Self {
        Self {
            table: "sign_inventory_current".into(),
            master_table: "species_master_current".into(),
            join: JoinKey::TreeId,
            common_name: CommonNameMode::Compare,
            output: "new_sign_orders.csv".into(),
            status_column: "sign_status".into(),
            notes_column: "sign_notes".into(),
            status_value: "Sign Issue".into(),
            columns: ColumnMapping::sign_inventory(),
            master_columns: ColumnMapping::species_master(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub table: String,
    pub output: String,
    pub api_base: String,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub common_name: CommonNameMode,
    pub columns: ColumnMapping,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            table: "species_master_current".into(),
            output: "taxonomic_discrepancies.csv".into(),
            api_base: "https://api.gbif.org/v1/species".into(),
            delay_ms: 50,
            timeout_secs: 30,
            common_name: CommonNameMode::Report,
            columns: ColumnMapping::species_list(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let s = &self.signs;
        for (key, value) in [
            ("signs.table", &s.table),
            ("signs.master_table", &s.master_table),
            ("signs.status_column", &s.status_column),
            ("signs.notes_column", &s.notes_column),
            ("taxonomy.table", &self.taxonomy.table),
            ("taxonomy.api_base", &self.taxonomy.api_base),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        if s.status_column == s.notes_column {
            return Err(ReconError::ConfigValidation(format!(
                "signs.status_column and signs.notes_column are both '{}'",
                s.status_column
            )));
        }

        if s.join == JoinKey::TreeId && (s.columns.id.is_none() || s.master_columns.id.is_none()) {
            return Err(ReconError::ConfigValidation(
                "join = \"tree_id\" requires an id column on both sign and master tables".into(),
            ));
        }

        if !self.taxonomy.api_base.starts_with("http://") && !self.taxonomy.api_base.starts_with("https://") {
            return Err(ReconError::ConfigValidation(format!(
                "taxonomy.api_base must be an http(s) URL, got '{}'",
                self.taxonomy.api_base
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
