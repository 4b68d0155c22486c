use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Run kosh shell commands against an in-memory filesystem image.
#[derive(Parser, Debug)]
#[command(name = "kosh-run", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML image describing files, mounts and processes.
    #[arg(long, global = true)]
    pub image: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single command line.
    Run(RunArgs),

    /// Execute every line of a script file.
    Script(ScriptArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Command line, e.g. `ls /home`.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub line: Vec<String>,
}

impl RunArgs {
    /// Words joined back into one line.
    pub fn line(&self) -> String {
        self.line.join(" ")
    }
}

#[derive(clap::Args, Debug)]
pub struct ScriptArgs {
    /// Script file, one command per line.
    pub file: PathBuf,
}
