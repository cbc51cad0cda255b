//! Shared plumbing for the `check-signs` and `check-taxonomy` binaries.

pub mod exit_codes;
pub mod logging;
pub mod settings;
pub mod signs;
pub mod summary;
pub mod taxonomy;

use std::process::ExitCode;

use signcheck_io::IoError;
use signcheck_recon::ReconError;

use exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_REPORT_WRITE, EXIT_UPDATE_FAILED, EXIT_USAGE};

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn report_write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REPORT_WRITE, message: msg.into(), hint: None }
    }

    pub fn update(msg: impl Into<String>) -> Self {
        Self { code: EXIT_UPDATE_FAILED, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// A load-time I/O failure, with a hint for the common cases.
    pub fn from_load(err: IoError) -> Self {
        let hint = match &err {
            IoError::NotFound(_) => Some("pass the path to the GeoPackage (or a directory of CSV tables)"),
            IoError::MissingTable { .. } => Some("use --table / --master-table to pick another layer"),
            _ => None,
        };
        let e = Self::input(err.to_string());
        match hint {
            Some(h) => e.with_hint(h),
            None => e,
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumns { .. } => {
                Some("map the column names in the config file ([signs.columns], [taxonomy.columns])")
            }
            _ => None,
        };
        let e = Self::input(err.to_string());
        match hint {
            Some(h) => e.with_hint(h),
            None => e,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Print a failed run the way both binaries do and convert it to an exit code.
pub fn finish(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError { code, message, hint }) => {
            eprintln!("error: {}", message);
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `--version` text shared by both binaries.
pub fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}
