use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::runner::RunReport;

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object on stdout.
    Json,
    /// Console bytes on stdout, verbatim.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Write a run report to `out`.
///
/// - **Json**: `{"results":[{"line","output","success"}],"success"}`.
/// - **Human**: each command's console output in order, nothing else.
pub fn emit<W: Write>(format: OutputFormat, report: &RunReport, out: &mut W) -> std::io::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = to_json(report)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Human => {
            for result in &report.results {
                out.write_all(result.output.as_bytes())?;
            }
        }
    }
    out.flush()
}

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
pub fn emit_error(format: OutputFormat, exit_code_num: u8, message: &str) {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": message,
                "exit_code": exit_code_num,
            });
            // stdout, so callers always get valid JSON there
            println!("{obj}");
        }
        OutputFormat::Human => {
            eprintln!("error: {message}");
        }
    }
}
