//! Lazy, columnar indexing engine for delimited text files.
//!
//! `open` mmaps one or more files, indexes the byte offset of every field
//! and record terminator in a single parallel pass, and hands back an
//! [`IndexCollection`] that answers `row`/`column`/cell lookups in O(1)
//! without ever materializing the parsed rows. Decoding (unescaping quoted
//! or backslash-escaped fields) happens lazily, per cell, on access.

pub mod byte_source;
pub mod cell;
pub mod collection;
pub mod dialect;
pub mod error;
pub mod parallel;
pub mod preamble;
pub mod region_indexer;
pub mod source_index;
pub mod views;

pub use byte_source::ByteSource;
pub use cell::Cell;
pub use collection::{ColumnCursor, ColumnView, IndexCollection};
pub use dialect::{DialectConfig, RaggedRowPolicy};
pub use error::{IndexError, RaggedRowDiagnostic, Result};
pub use source_index::SourceIndex;
pub use views::RowView;

use std::io::{Read, Write};
use std::path::Path;

/// Opens and indexes one or more files under a shared dialect, returning a
/// collection that concatenates their rows.
pub fn open(paths: &[impl AsRef<Path>], dialect: DialectConfig) -> Result<IndexCollection> {
    IndexCollection::open(paths, dialect)
}

/// Indexes a single file.
pub fn open_file(path: impl AsRef<Path>, dialect: DialectConfig) -> Result<SourceIndex> {
    SourceIndex::open(path, dialect)
}

/// Spills a non-seekable stream to a temporary file, then indexes that
/// file.
///
/// This crate's ingestion model is "index a byte range of an mmap-able
/// file," so a stream with no such backing is first given one. The spill
/// file is unlinked automatically once the returned `SourceIndex` (and the
/// mmap it holds open) is dropped.
pub fn open_stream(mut reader: impl Read, dialect: DialectConfig) -> Result<SourceIndex> {
    let mut spill = tempfile::NamedTempFile::new().map_err(|source| IndexError::Io {
        path: std::env::temp_dir(),
        source,
    })?;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|source| IndexError::Io {
            path: spill.path().to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        spill.write_all(&buf[..n]).map_err(|source| IndexError::Io {
            path: spill.path().to_path_buf(),
            source,
        })?;
    }
    spill.flush().map_err(|source| IndexError::Io {
        path: spill.path().to_path_buf(),
        source,
    })?;

    let temp_path = spill.into_temp_path();
    let mut index = SourceIndex::open(&temp_path, dialect)?;
    index.set_spill_guard(temp_path);
    Ok(index)
}
