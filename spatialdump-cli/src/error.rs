//! CLI error handling with user-facing messages and exit codes.

use std::fmt;
use std::process;

use spatialdump::pipeline::{PipelineError, Stage};

/// Errors that end the process.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// The run failed at some stage
    Pipeline(PipelineError),
}

impl CliError {
    /// Prints the error with a hint and exits with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Pipeline(e) = self {
            match (e.stage(), e.offset()) {
                (Stage::Parse, Some(offset)) => {
                    eprintln!("  stage: parse, byte offset {}", offset);
                    eprintln!("  The dump is malformed or truncated; no image was written.");
                }
                (Stage::Read, Some(offset)) => {
                    eprintln!("  stage: read, byte offset {}", offset);
                    eprintln!("  The input became unreadable partway through.");
                }
                (Stage::Config, _) => {
                    eprintln!("  stage: config");
                    eprintln!("  Check the file passed with --config.");
                }
                (Stage::Parse, None) | (Stage::Read, _) => {
                    eprintln!("  stage: {}", e.stage());
                    eprintln!("  If the dump is a leaf dump, try --dialect leaves.");
                }
                (stage, _) => eprintln!("  stage: {}", stage),
            }
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Pipeline(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pipeline(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}
