//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes of `check-signs` and
//! `check-taxonomy`. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success. Discrepancies found are not an error.       |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Fatal input: missing file, table, columns, bad config |
//! | 4    | Report could not be written                          |
//! | 5    | In-place status update failed (report was written)   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - run completed. Discrepancies are reported, not failed on.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. HTTP client setup).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. Also what clap exits with.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be loaded: missing GeoPackage, missing table,
/// missing required columns, unreadable or invalid config file.
/// Nothing is written.
pub const EXIT_INPUT: u8 = 3;

/// The discrepancy report CSV could not be written.
pub const EXIT_REPORT_WRITE: u8 = 4;

/// Writing sign status back to the inventory failed.
/// The report CSV was already written when this is returned.
pub const EXIT_UPDATE_FAILED: u8 = 5;
