//! Host-side runner for kosh shell commands.

pub mod cli;
pub mod error;
pub mod image;
pub mod logger;
pub mod output;
pub mod runner;

use std::io::Write;

use crate::cli::{Cli, Command};
use crate::error::RunError;
use crate::image::Image;
use crate::runner::{RunReport, Runner};

/// Execute the parsed command line, writing output to `out`.
///
/// Output is emitted even when a command failed; the returned error only
/// carries the exit status.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<RunReport, RunError> {
    let image = match &cli.image {
        Some(path) => image::load_image(path)?,
        None => Image::default(),
    };
    let runner = Runner::new(image)?;

    let report = match &cli.command {
        Command::Run(args) => runner.run_line(&args.line()),
        Command::Script(args) => runner.run_script(&args.file)?,
    };

    output::emit(cli.output, &report, out)?;
    report.into_result().map_err(|(_, err)| err)
}
