//! `check-signs` - compare the sign inventory against the species master.
//!
//! Writes a sign order list for every tree whose sign disagrees with the
//! master (or has no master row), then marks those signs in the inventory.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use signcheck_io::{Source, StatusColumns};
use signcheck_recon::config::{CommonNameMode, ComparisonMode, JoinKey};
use signcheck_recon::load::load_records;
use signcheck_recon::report::{sign_order_rows, status_updates};
use signcheck_recon::{run as run_recon, MasterIndex};

use crate::{settings, summary, CliError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoinArg {
    TreeId,
    ScientificName,
}

impl From<JoinArg> for JoinKey {
    fn from(arg: JoinArg) -> Self {
        match arg {
            JoinArg::TreeId => JoinKey::TreeId,
            JoinArg::ScientificName => JoinKey::ScientificName,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommonNameArg {
    /// Common name mismatches are discrepancies
    Compare,
    /// Common name is copied into the report but never compared
    Report,
}

impl From<CommonNameArg> for CommonNameMode {
    fn from(arg: CommonNameArg) -> Self {
        match arg {
            CommonNameArg::Compare => CommonNameMode::Compare,
            CommonNameArg::Report => CommonNameMode::Report,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "check-signs",
    version,
    long_version = crate::long_version(),
    about = "Check tree signs against the species master and list signs to reorder",
    after_help = "\
Examples:
  check-signs trees.gpkg
  check-signs trees.gpkg --dry-run --json
  check-signs trees.gpkg --join scientific-name --common-name report
  check-signs exports/ --output orders.csv      (directory of <table>.csv files)"
)]
pub struct SignsArgs {
    /// GeoPackage holding both tables, or a directory of <table>.csv files
    pub source: PathBuf,

    /// Sign inventory table [default: sign_inventory_current]
    #[arg(long)]
    pub table: Option<String>,

    /// Species master table [default: species_master_current]
    #[arg(long)]
    pub master_table: Option<String>,

    /// How signs are matched to master rows [default: tree-id]
    #[arg(long, value_enum)]
    pub join: Option<JoinArg>,

    /// Whether the common name is compared or only reported [default: compare]
    #[arg(long, value_enum)]
    pub common_name: Option<CommonNameArg>,

    /// Sign order CSV to write [default: new_sign_orders.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the report but leave the inventory untouched
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Config file [default: <config dir>/signcheck/config.toml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: SignsArgs) -> Result<(), CliError> {
    let mut config = settings::load(args.config.as_deref())?;
    let cfg = &mut config.signs;
    if let Some(table) = args.table {
        cfg.table = table;
    }
    if let Some(master) = args.master_table {
        cfg.master_table = master;
    }
    if let Some(join) = args.join {
        cfg.join = join.into();
    }
    if let Some(mode) = args.common_name {
        cfg.common_name = mode.into();
    }
    if let Some(ref output) = args.output {
        cfg.output = output.to_string_lossy().into_owned();
    }
    settings::validate(&config)?;
    let cfg = &config.signs;

    let source = Source::open(&args.source).map_err(CliError::from_load)?;
    let signs = source.read_table(&cfg.table).map_err(CliError::from_load)?;
    let master = source.read_table(&cfg.master_table).map_err(CliError::from_load)?;

    let subjects = load_records(&signs, &cfg.columns)?;
    let masters = load_records(&master, &cfg.master_columns)?;

    let mut index = MasterIndex::build(masters, cfg.join);
    if index.duplicate_keys() > 0 {
        tracing::warn!(
            table = cfg.master_table.as_str(),
            join = %cfg.join,
            duplicates = index.duplicate_keys(),
            "duplicate master keys, first row kept"
        );
    }

    let spec = ComparisonMode::signs(cfg.common_name).build();
    let result = run_recon("check-signs", Some(cfg.join), cfg.common_name, &subjects, &mut index, &spec);

    if result.discrepancies.is_empty() {
        tracing::info!("all signs match the species master, no report written");
    } else {
        let output = PathBuf::from(&cfg.output);
        signcheck_io::csv::write_csv(&sign_order_rows(&result.discrepancies), &output).map_err(|e| {
            CliError::report_write(format!("cannot write {}: {e}", output.display()))
        })?;
        eprintln!("wrote {} ({} signs to reorder)", output.display(), result.discrepancies.len());

        if args.dry_run {
            tracing::info!("dry run, inventory not updated");
        } else if !source.supports_updates() {
            tracing::warn!(source = %source.path().display(), "source is read-only, inventory not updated");
        } else {
            let updates = status_updates(&result.discrepancies, &cfg.status_value);
            let columns = StatusColumns {
                status: cfg.status_column.clone(),
                notes: cfg.notes_column.clone(),
            };
            let changed = source.write_status_updates(&cfg.table, &columns, &updates).map_err(|e| {
                CliError::update(format!("cannot update {}: {e}", cfg.table))
                    .with_hint(format!("the report was already written to {}", output.display()))
            })?;
            eprintln!("marked {} signs in {} as '{}'", changed, cfg.table, cfg.status_value);
        }
    }

    if args.json {
        summary::print_json(&result)?;
    }
    eprintln!("{}", summary::human(&result));
    Ok(())
}
