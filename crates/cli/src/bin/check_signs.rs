use std::process::ExitCode;

use clap::Parser;
use signcheck_cli::signs::{run, SignsArgs};

fn main() -> ExitCode {
    let args = SignsArgs::parse();
    signcheck_cli::logging::init();
    signcheck_cli::finish(run(args))
}
