use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty table name, clashing columns, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// One or more mapped columns are absent from the input table.
    #[error("table '{table}': missing column(s) {}", quoted(.columns))]
    MissingColumns { table: String, columns: Vec<String> },
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
