use std::path::PathBuf;
use std::process::ExitCode;

/// All errors produced by kosh-run.
///
/// Variants are split into two categories:
/// - **Infrastructure errors** (exit code 2): unreadable or malformed input
/// - **Operational errors** (exit code 1): a shell command reported failure
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    // ── Infrastructure errors (exit code 2) ──────────────────────────

    #[error("Image not found: {path}")]
    ImageNotFound { path: PathBuf },

    #[error("Image parse error: {0}")]
    ImageParse(String),

    #[error("Invalid image entry '{entry}': {reason}")]
    InvalidImage { entry: String, reason: String },

    #[error("Script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Operational errors (exit code 1) ─────────────────────────────

    #[error("{failed} of {total} command(s) failed")]
    CommandFailed { failed: usize, total: usize },
}

impl RunError {
    /// Raw exit status.
    ///
    /// - `2`: infrastructure error (missing input, bad image, I/O)
    /// - `1`: operational failure (a command failed)
    pub fn code(&self) -> u8 {
        match self {
            Self::ImageNotFound { .. }
            | Self::ImageParse(_)
            | Self::InvalidImage { .. }
            | Self::ScriptNotFound { .. }
            | Self::Io(_)
            | Self::Json(_) => 2,

            Self::CommandFailed { .. } => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
