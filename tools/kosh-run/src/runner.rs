//! Line and script execution.

use std::path::Path;

use serde::Serialize;
use storage::MemFs;
use terminal::{BufferConsole, ProcessTable, Shell};

use crate::error::RunError;
use crate::image::Image;

/// One executed line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineResult {
    pub line: String,
    /// Console output, decoded as UTF-8 with invalid bytes replaced.
    pub output: String,
    pub success: bool,
}

/// Every executed line, in order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunReport {
    pub results: Vec<LineResult>,
    pub success: bool,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    /// `Ok` if every line succeeded.
    pub fn into_result(self) -> Result<Self, (Self, RunError)> {
        if self.success {
            Ok(self)
        } else {
            let err = RunError::CommandFailed {
                failed: self.failed(),
                total: self.results.len(),
            };
            Err((self, err))
        }
    }
}

/// A shell bound to one image.
pub struct Runner {
    fs: MemFs,
    procs: ProcessTable,
    image: Image,
}

impl Runner {
    pub fn new(image: Image) -> Result<Self, RunError> {
        let (fs, procs) = image.build()?;
        Ok(Runner { fs, procs, image })
    }

    pub fn fs(&self) -> &MemFs {
        &self.fs
    }

    pub fn procs(&self) -> &ProcessTable {
        &self.procs
    }

    /// Execute lines in order, never stopping early. Blank lines and
    /// `#` comments are skipped.
    pub fn run_lines<'a, I>(&self, lines: I) -> RunReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut shell = Shell::with_config(&self.fs, &self.procs, self.image.shell.clone());
        let mut results = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut console = BufferConsole::new();
            let result = shell.execute(line, &mut console);
            log::debug!("{} -> exit {}", line, result.exit_code());
            results.push(LineResult {
                line: line.to_string(),
                output: console.text(),
                success: result.success,
            });
        }

        let success = results.iter().all(|r| r.success);
        RunReport { results, success }
    }

    pub fn run_line(&self, line: &str) -> RunReport {
        self.run_lines([line])
    }

    /// Execute a script file line by line.
    pub fn run_script(&self, path: &Path) -> Result<RunReport, RunError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunError::ScriptNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                RunError::Io(e)
            }
        })?;
        Ok(self.run_lines(content.lines()))
    }
}
