// Table I/O: GeoPackage layers, CSV tables, CSV reports

pub mod csv;
pub mod gpkg;

use std::path::{Path, PathBuf};

use signcheck_recon::model::Table;
use signcheck_recon::report::StatusUpdate;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("table '{table}' not found in {}", .path.display())]
    MissingTable { path: PathBuf, table: String },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Unsupported(String),
}

/// Where tables live: a GeoPackage file, or a directory of `<table>.csv` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    GeoPackage(PathBuf),
    CsvDir(PathBuf),
}

/// Column names used when writing sign status back to the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusColumns {
    pub status: String,
    pub notes: String,
}

impl Source {
    /// Resolve a source path. Missing paths are a fatal input error.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        if !path.exists() {
            return Err(IoError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            Ok(Self::CsvDir(path.to_path_buf()))
        } else {
            Ok(Self::GeoPackage(path.to_path_buf()))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::GeoPackage(p) | Self::CsvDir(p) => p,
        }
    }

    pub fn read_table(&self, table: &str) -> Result<Table, IoError> {
        let t = match self {
            Self::GeoPackage(path) => gpkg::read_table(path, table)?,
            Self::CsvDir(dir) => {
                let path = dir.join(format!("{table}.csv"));
                if !path.exists() {
                    return Err(IoError::MissingTable { path: dir.clone(), table: table.into() });
                }
                csv::read_table(&path, table)?
            }
        };
        tracing::info!(table, rows = t.rows.len(), "loaded table");
        Ok(t)
    }

    pub fn supports_updates(&self) -> bool {
        matches!(self, Self::GeoPackage(_))
    }

    /// Write status + note for each update. Returns the number of rows changed.
    pub fn write_status_updates(
        &self,
        table: &str,
        columns: &StatusColumns,
        updates: &[StatusUpdate],
    ) -> Result<usize, IoError> {
        match self {
            Self::GeoPackage(path) => gpkg::write_status_updates(path, table, columns, updates),
            Self::CsvDir(dir) => Err(IoError::Unsupported(format!(
                "in-place updates are not supported for CSV directory {}",
                dir.display()
            ))),
        }
    }
}
