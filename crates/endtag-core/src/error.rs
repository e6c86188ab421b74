//! Error types.
//!
//! Failures while resolving a single closing brace are never errors: that brace is skipped and
//! the scan continues. The types below cover the cases a caller can act on.

use thiserror::Error;

/// Why a scan pass produced no generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The pass observed its cancellation token; the previous generation stays current.
    #[error("scan cancelled")]
    Cancelled,
    /// The scan worker panicked; the previous generation stays current.
    #[error("scan worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Errors applying a [`TextDelta`](crate::TextDelta) to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The delta was recorded against a document of a different length.
    #[error("delta expects {expected} chars, snapshot has {actual}")]
    LengthMismatch {
        /// Character count the delta was recorded against.
        expected: usize,
        /// Character count of the snapshot.
        actual: usize,
    },
    /// An edit reaches past the end of the document.
    #[error("edit end {offset} is past the end of the document ({len} chars)")]
    OutOfBounds {
        /// Offending offset.
        offset: usize,
        /// Document length at that edit.
        len: usize,
    },
    /// An edit's deleted text does not match the document.
    #[error("deleted text does not match the document at offset {offset}")]
    DeltaMismatch {
        /// Start offset of the offending edit.
        offset: usize,
    },
}

/// Errors parsing an explicit options document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid end tag options: {0}")]
    Parse(#[from] toml::de::Error),
    /// The options file could not be read.
    #[error("cannot read end tag options: {0}")]
    Io(#[from] std::io::Error),
}
