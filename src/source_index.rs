// SourceIndex: the per-file offset vector plus O(1) cell access.
//
// Builds on `preamble`, `parallel::build_index`, and `region_indexer`; the
// `get(row, col)` arithmetic follows the original vroom `index::column`
// iterator's offset-pair reconstruction in `index.h`, adapted to the flat
// single-offset-vector representation described by this crate's data
// model rather than vroom's split row/column index.

use std::path::Path;

use crate::byte_source::ByteSource;
use crate::cell::Cell;
use crate::dialect::DialectConfig;
use crate::error::{IndexError, RaggedRowDiagnostic, Result};
use crate::parallel;
use crate::preamble;
use crate::views::RowView;

pub struct SourceIndex {
    source: ByteSource,
    preamble_start: usize,
    header_offsets: Option<Vec<usize>>,
    data_start: usize,
    offsets: Vec<usize>,
    columns: usize,
    rows: usize,
    dialect: DialectConfig,
    ragged_rows: Vec<RaggedRowDiagnostic>,
    // Declared last so it drops (and unlinks the backing file) after
    // `source`'s mmap has already been dropped. Set only by `open_stream`'s
    // spill-to-temp-file path.
    spill: Option<tempfile::TempPath>,
}

impl SourceIndex {
    pub fn open(path: impl AsRef<Path>, dialect: DialectConfig) -> Result<Self> {
        let started = std::time::Instant::now();
        let source = ByteSource::open(&path)?;
        let preamble_start = preamble::find_first_line(source.data(), &dialect);

        let build = parallel::build_index(&source, &dialect, preamble_start);

        if build.ending_in_quote {
            return Err(IndexError::MalformedInput {
                path: source.path().to_path_buf(),
                offset: source.size(),
                reason: "file ends inside an unterminated quoted field".into(),
            });
        }

        let (header_offsets, data_start, offsets, rows) = if dialect.has_header && build.rows > 0
        {
            let columns = build.columns;
            let header_offsets = build.offsets[..columns].to_vec();
            let data_start = *header_offsets.last().unwrap() + 1;
            let data_offsets = build.offsets[columns..].to_vec();
            (Some(header_offsets), data_start, data_offsets, build.rows - 1)
        } else {
            (None, preamble_start, build.offsets, build.rows)
        };

        for diag in &build.ragged_rows {
            log::warn!(
                "{}: row {} expected {} fields, found {}",
                source.path().display(),
                diag.row,
                diag.expected,
                diag.found
            );
        }

        log::info!(
            "indexed {} ({} rows, {} columns) in {:?}",
            source.path().display(),
            rows,
            build.columns,
            started.elapsed()
        );

        Ok(Self {
            source,
            preamble_start,
            header_offsets,
            data_start,
            offsets,
            columns: build.columns,
            rows,
            dialect,
            ragged_rows: build.ragged_rows,
            spill: None,
        })
    }

    /// Attaches a temp-file guard so the backing file is unlinked when this
    /// index is dropped. Used by `open_stream` for spilled stream input.
    pub(crate) fn set_spill_guard(&mut self, guard: tempfile::TempPath) {
        self.spill = Some(guard);
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    pub fn filename(&self) -> &Path {
        self.source.path()
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    pub fn ragged_rows(&self) -> &[RaggedRowDiagnostic] {
        &self.ragged_rows
    }

    pub fn header(&self) -> Option<RowView<'_>> {
        let header_offsets = self.header_offsets.as_ref()?;
        let cells = (0..self.columns)
            .map(|c| self.cell_from(header_offsets, self.preamble_start, c, 0))
            .collect();
        Some(RowView::new(cells))
    }

    pub fn get(&self, row: usize, col: usize) -> Cell<'_> {
        assert!(row < self.rows, "row {row} out of bounds ({})", self.rows);
        assert!(col < self.columns, "col {col} out of bounds ({})", self.columns);
        self.cell_from(&self.offsets, self.data_start, col, row)
    }

    pub fn row(&self, row: usize) -> RowView<'_> {
        let cells = (0..self.columns).map(|c| self.get(row, c)).collect();
        RowView::new(cells)
    }

    /// `offsets` is a flat, row-major terminator vector over `self.columns`
    /// columns; `row_data_start` is the byte offset where its first cell
    /// begins.
    fn cell_from(&self, offsets: &[usize], row_data_start: usize, col: usize, row: usize) -> Cell<'_> {
        let columns = self.columns;
        let k = row * columns + col;
        let data = self.source.data();

        let mut begin = if k == 0 {
            row_data_start
        } else {
            let prev = offsets[k - 1];
            let prev_is_newline = (k - 1) % columns == columns - 1;
            prev + if prev_is_newline { 1 } else { self.dialect.delim.len() }
        };
        let mut end = offsets[k];

        // CR stripping only applies to the record terminator (last column).
        if col == columns - 1 && end > begin && data[end - 1] == b'\r' {
            end -= 1;
        }

        if begin > end {
            // A padded/ragged cell: collapse to empty rather than panic.
            begin = end;
        }

        if self.dialect.trim_ws {
            while begin < end && (data[begin] == b' ' || data[begin] == b'\t') {
                begin += 1;
            }
            while end > begin && (data[end - 1] == b' ' || data[end - 1] == b'\t') {
                end -= 1;
            }
        }

        let mut needs_decode = false;
        if let Some(q) = self.dialect.quote {
            if end - begin >= 2 && data[begin] == q && data[end - 1] == q {
                begin += 1;
                end -= 1;
                needs_decode = true;
            }
        }

        let span = &data[begin..end];
        if !needs_decode {
            if self.dialect.escape_backslash && memchr::memchr(b'\\', span).is_some() {
                needs_decode = true;
            }
            if !needs_decode && self.dialect.escape_double {
                if let Some(q) = self.dialect.quote {
                    needs_decode = contains_doubled(span, q);
                }
            }
        }

        Cell::new(span, needs_decode)
    }
}

fn contains_doubled(span: &[u8], q: u8) -> bool {
    let mut i = 0;
    while i + 1 < span.len() {
        if span[i] == q && span[i + 1] == q {
            return true;
        }
        i += 1;
    }
    false
}
