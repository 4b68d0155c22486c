use std::process::ExitCode;

use clap::Parser;

use kosh_run::cli::Cli;
use kosh_run::error::RunError;
use kosh_run::{logger, output};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let stdout = std::io::stdout();
    match kosh_run::run(&cli, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        // Output already written; only the status is left to report.
        Err(e @ RunError::CommandFailed { .. }) => {
            log::info!("{e}");
            e.exit_code()
        }
        Err(e) => {
            output::emit_error(cli.output, e.code(), &e.to_string());
            e.exit_code()
        }
    }
}
