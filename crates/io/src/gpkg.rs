//! GeoPackage layers.
//!
//! A GeoPackage is an SQLite database; attribute tables and feature layers
//! are ordinary tables. Reads open the file read-only. Status write-back adds
//! missing TEXT columns and updates rows by rowid inside one transaction.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use signcheck_recon::model::{Table, TableRow};
use signcheck_recon::report::StatusUpdate;

use crate::{IoError, StatusColumns};

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn ensure_table(conn: &Connection, path: &Path, table: &str) -> Result<(), IoError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(IoError::MissingTable { path: path.to_path_buf(), table: table.to_string() }),
    }
}

/// Render one SQLite value as cell text. Geometry blobs and NULLs are absent.
fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) if f.is_nan() => None,
        // Integral reals (ids stored as REAL) render without a trailing ".0"
        ValueRef::Real(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((f as i64).to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

pub fn read_table(path: &Path, table: &str) -> Result<Table, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    ensure_table(&conn, path, table)?;

    let sql = format!("SELECT rowid, * FROM {}", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().iter().skip(1).map(|c| c.to_string()).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            let rowid: i64 = row.get(0)?;
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(cell_text(row.get_ref(i + 1)?));
            }
            Ok(TableRow { rowid: Some(rowid), cells })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table { name: table.to_string(), columns, rows })
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, IoError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map(params![table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Write status and note onto each updated row, creating the columns if needed.
///
/// All changes commit together or not at all. Returns the number of rows changed.
pub fn write_status_updates(
    path: &Path,
    table: &str,
    columns: &StatusColumns,
    updates: &[StatusUpdate],
) -> Result<usize, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let mut conn = Connection::open(path)?;
    ensure_table(&conn, path, table)?;

    let existing = table_columns(&conn, table)?;
    let tx = conn.transaction()?;

    for column in [&columns.status, &columns.notes] {
        if !existing.iter().any(|c| c.eq_ignore_ascii_case(column)) {
            tracing::info!(table, column = column.as_str(), "adding column");
            tx.execute(
                &format!(
                    "ALTER TABLE {} ADD COLUMN {} TEXT",
                    quote_ident(table),
                    quote_ident(column)
                ),
                [],
            )?;
        }
    }

    let mut changed = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "UPDATE {} SET {} = ?1, {} = ?2 WHERE rowid = ?3",
            quote_ident(table),
            quote_ident(&columns.status),
            quote_ident(&columns.notes)
        ))?;
        for update in updates {
            let n = stmt.execute(params![update.status, update.note, update.rowid])?;
            if n == 0 {
                tracing::warn!(subject = update.subject_id.as_str(), rowid = update.rowid, "row vanished before update");
            }
            changed += n;
        }
    }
    tx.commit()?;

    Ok(changed)
}
