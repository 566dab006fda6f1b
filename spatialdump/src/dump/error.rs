//! Error types for dump parsing.

use std::io;

use thiserror::Error;

/// Longest excerpt, in characters, quoted in a parse diagnostic.
pub const EXCERPT_LEN: usize = 40;

/// Errors raised while scanning or assembling a dump.
///
/// Every variant carries the byte offset the problem was found at. Parsing is
/// fail-fast: the first error aborts the whole file.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The underlying reader failed.
    #[error("I/O error at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// An open delimiter was never closed, or a close had no open.
    #[error("Unbalanced delimiter at byte {offset}: `{excerpt}`")]
    UnbalancedDelimiter { offset: u64, excerpt: String },

    /// A group had the wrong shape, or a field or header line is not an integer.
    #[error("Malformed tuple at byte {offset}: `{raw}` ({reason})")]
    MalformedTuple {
        offset: u64,
        raw: String,
        reason: String,
    },

    /// The input ended before a required line.
    #[error("Truncated input at byte {offset}: expected {expected}")]
    TruncatedInput { offset: u64, expected: &'static str },
}

impl DumpError {
    /// Byte offset of the offending region.
    pub fn offset(&self) -> u64 {
        match self {
            DumpError::Io { offset, .. }
            | DumpError::UnbalancedDelimiter { offset, .. }
            | DumpError::MalformedTuple { offset, .. }
            | DumpError::TruncatedInput { offset, .. } => *offset,
        }
    }

    pub(crate) fn malformed(offset: u64, raw: &str, reason: impl Into<String>) -> Self {
        DumpError::MalformedTuple {
            offset,
            raw: excerpt(raw),
            reason: reason.into(),
        }
    }
}

/// Result alias for dump parsing.
pub type DumpResult<T> = Result<T, DumpError>;

/// Shortens `text` to at most [`EXCERPT_LEN`] characters.
pub(crate) fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EXCERPT_LEN).collect();
    short.push_str("...");
    short
}
