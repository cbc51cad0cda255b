//! `check-taxonomy` - compare the species list against the GBIF backbone.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use signcheck_io::Source;
use signcheck_recon::config::ComparisonMode;
use signcheck_recon::load::{assign_row_ids, load_records};
use signcheck_recon::model::Record;
use signcheck_recon::report::taxonomy_rows;
use signcheck_recon::{run as run_recon, ReferenceResolver};
use signcheck_taxon::{GbifClient, GbifResolver};

use crate::signs::CommonNameArg;
use crate::{settings, summary, CliError};

#[derive(Debug, Parser)]
#[command(
    name = "check-taxonomy",
    version,
    long_version = crate::long_version(),
    about = "Check species names and families against the GBIF backbone taxonomy",
    after_help = "\
Examples:
  check-taxonomy trees.gpkg
  check-taxonomy trees.gpkg --table species_list --delay-ms 200
  check-taxonomy trees.gpkg --common-name compare --json > result.json
  GBIF_API_URL=http://localhost:8080/v1/species check-taxonomy trees.gpkg"
)]
pub struct TaxonomyArgs {
    /// GeoPackage holding the species table, or a directory of <table>.csv files
    pub source: PathBuf,

    /// Species table [default: species_master_current]
    #[arg(long)]
    pub table: Option<String>,

    /// Discrepancy CSV to write [default: taxonomic_discrepancies.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// GBIF species API root [default: https://api.gbif.org/v1/species]
    #[arg(long, env = "GBIF_API_URL")]
    pub api_base: Option<String>,

    /// Pause between lookups, in milliseconds [default: 50]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout, in seconds [default: 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Whether the GBIF common name is compared or only reported [default: report]
    #[arg(long, value_enum)]
    pub common_name: Option<CommonNameArg>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print the full result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Config file [default: <config dir>/signcheck/config.toml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn progress_bar(len: u64, hidden: bool) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if hidden {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Checking species");
    pb
}

pub fn run(args: TaxonomyArgs) -> Result<(), CliError> {
    let mut config = settings::load(args.config.as_deref())?;
    let cfg = &mut config.taxonomy;
    if let Some(table) = args.table {
        cfg.table = table;
    }
    if let Some(ref output) = args.output {
        cfg.output = output.to_string_lossy().into_owned();
    }
    if let Some(api_base) = args.api_base {
        cfg.api_base = api_base;
    }
    if let Some(delay) = args.delay_ms {
        cfg.delay_ms = delay;
    }
    if let Some(timeout) = args.timeout_secs {
        cfg.timeout_secs = timeout;
    }
    if let Some(mode) = args.common_name {
        cfg.common_name = mode.into();
    }
    settings::validate(&config)?;
    let cfg = &config.taxonomy;

    let source = Source::open(&args.source).map_err(CliError::from_load)?;
    let table = source.read_table(&cfg.table).map_err(CliError::from_load)?;
    let mut subjects = load_records(&table, &cfg.columns)?;
    assign_row_ids(&mut subjects);

    let client = GbifClient::new(&cfg.api_base, Duration::from_secs(cfg.timeout_secs))
        .map_err(|e| CliError::general(format!("cannot set up HTTP client: {e}")))?;
    let mut gbif = GbifResolver::new(client).with_delay(Duration::from_millis(cfg.delay_ms));
    tracing::info!(species = subjects.len(), api = cfg.api_base.as_str(), "checking taxonomy");

    let bar = progress_bar(subjects.len() as u64, args.no_progress || args.json);
    let mut resolver = |subject: &Record| {
        let resolution = bar.suspend(|| gbif.resolve(subject));
        bar.inc(1);
        resolution
    };
    let spec = ComparisonMode::taxonomy(cfg.common_name).build();
    let result = run_recon("check-taxonomy", None, cfg.common_name, &subjects, &mut resolver, &spec);
    bar.finish_and_clear();

    if result.discrepancies.is_empty() {
        tracing::info!("no taxonomic discrepancies, all entries consistent with GBIF");
    } else {
        let output = PathBuf::from(&cfg.output);
        signcheck_io::csv::write_csv(&taxonomy_rows(&result.discrepancies), &output).map_err(|e| {
            CliError::report_write(format!("cannot write {}: {e}", output.display()))
        })?;
        eprintln!("wrote {} ({} discrepancies)", output.display(), result.discrepancies.len());
    }

    if args.json {
        summary::print_json(&result)?;
    }
    eprintln!("{}", summary::human(&result));
    Ok(())
}
