// Error types for the indexing engine.
//
// Mirrors the approach the sibling `lazycsv`/`isrc` crates take: a single
// `thiserror`-derived enum rather than hand-rolled `Display`/`Error` impls.

use std::io;
use std::path::PathBuf;

/// A diagnostic recorded (not raised) when a data row's field count does not
/// match the column count established by the header or first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedRowDiagnostic {
    /// Zero-based data row index (post-header) where the mismatch occurred.
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed input in {path} at byte {offset}: {reason}")]
    MalformedInput {
        path: PathBuf,
        offset: usize,
        reason: String,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid dialect: {0}")]
    InvalidDialect(String),

    #[error("indexing cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, IndexError>;
