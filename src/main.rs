use std::process::ExitCode;

use clap::Parser;

use tsrank::cli::{run, Cli};
use tsrank::observability::init_logging;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
