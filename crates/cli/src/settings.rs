//! Run configuration: config file (explicit or per-user), then CLI overrides.

use std::path::{Path, PathBuf};

use signcheck_recon::ReconConfig;

use crate::CliError;

/// Per-user config file location (`$XDG_CONFIG_HOME/signcheck/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("signcheck").join("config.toml"))
}

/// Load the run configuration.
///
/// An explicit `--config` path must exist. Without one, the per-user file is
/// used when present, else built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                return Err(CliError::input(format!("config file not found: {}", p.display())));
            }
            p.to_path_buf()
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(p) => p,
            None => {
                tracing::debug!("no config file, using defaults");
                return Ok(ReconConfig::default());
            }
        },
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::input(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text)
        .map_err(|e| CliError::from(e).with_hint(format!("in {}", path.display())))?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Re-check the configuration after CLI overrides were applied.
pub fn validate(config: &ReconConfig) -> Result<(), CliError> {
    config.validate().map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_INPUT;
    use signcheck_recon::config::{CommonNameMode, JoinKey};
    use tempfile::tempdir;

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("signcheck.toml");
        std::fs::write(
            &path,
            r#"
[signs]
join = "scientific_name"
output = "orders.csv"

[taxonomy]
delay_ms = 0
common_name = "compare"
"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.signs.join, JoinKey::ScientificName);
        assert_eq!(config.signs.output, "orders.csv");
        assert_eq!(config.signs.table, "sign_inventory_current");
        assert_eq!(config.taxonomy.delay_ms, 0);
        assert_eq!(config.taxonomy.common_name, CommonNameMode::Compare);
    }

    #[test]
    fn missing_explicit_file_is_input_error() {
        let dir = tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_INPUT);
        assert!(err.message.contains("nope.toml"));
    }

    #[test]
    fn invalid_file_is_input_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[signs]\nstatus_column = \"x\"\nnotes_column = \"x\"\n").unwrap();
        let err = load(Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_INPUT);
        assert!(err.hint.unwrap().contains("bad.toml"));
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("signcheck/config.toml"));
        }
    }
}
