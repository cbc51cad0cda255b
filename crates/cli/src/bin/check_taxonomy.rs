use std::process::ExitCode;

use clap::Parser;
use signcheck_cli::taxonomy::{run, TaxonomyArgs};

fn main() -> ExitCode {
    let args = TaxonomyArgs::parse();
    signcheck_cli::logging::init();
    signcheck_cli::finish(run(args))
}
