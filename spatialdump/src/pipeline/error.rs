//! Pipeline errors, tagged with the stage that failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::dump::DumpError;
use crate::render::RenderError;

/// A step of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Read,
    Parse,
    Render,
    Write,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Read => "read",
            Stage::Parse => "parse",
            Stage::Render => "render",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error("Failed to read '{}'{}: {source}", path.display(), at_byte(*offset))]
    Read {
        path: PathBuf,
        /// Set when the failure happened mid-scan
        offset: Option<u64>,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DumpError,
    },

    #[error("Failed to render: {0}")]
    Render(#[source] RenderError),

    #[error(transparent)]
    Write(RenderError),
}

impl PipelineError {
    /// Stage the run stopped at.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Config(_) => Stage::Config,
            PipelineError::Read { .. } => Stage::Read,
            PipelineError::Parse { .. } => Stage::Parse,
            PipelineError::Render(_) => Stage::Render,
            PipelineError::Write(_) => Stage::Write,
        }
    }

    /// Byte offset into the input, for parse and mid-scan read failures.
    pub fn offset(&self) -> Option<u64> {
        match self {
            PipelineError::Parse { source, .. } => Some(source.offset()),
            PipelineError::Read { offset, .. } => *offset,
            _ => None,
        }
    }
}

fn at_byte(offset: Option<u64>) -> String {
    offset.map(|o| format!(" at byte {}", o)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_reports_stage_and_offset() {
        let err = PipelineError::Parse {
            path: PathBuf::from("nodeTree.log"),
            source: DumpError::UnbalancedDelimiter {
                offset: 17,
                excerpt: "(3,".to_string(),
            },
        };

        assert_eq!(err.stage(), Stage::Parse);
        assert_eq!(err.offset(), Some(17));
        assert_eq!(
            err.to_string(),
            "Failed to parse 'nodeTree.log': Unbalanced delimiter at byte 17: `(3,`"
        );
    }

    #[test]
    fn test_read_error_mid_scan_keeps_offset() {
        let err = PipelineError::Read {
            path: PathBuf::from("nodeTree.log"),
            offset: Some(4096),
            source: io::Error::new(io::ErrorKind::Other, "disk gone"),
        };

        assert_eq!(err.stage(), Stage::Read);
        assert_eq!(err.offset(), Some(4096));
        assert_eq!(
            err.to_string(),
            "Failed to read 'nodeTree.log' at byte 4096: disk gone"
        );
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<_> = [
            Stage::Config,
            Stage::Read,
            Stage::Parse,
            Stage::Render,
            Stage::Write,
        ]
        .iter()
        .map(Stage::to_string)
        .collect();
        assert_eq!(names, ["config", "read", "parse", "render", "write"]);
    }
}
