// ParallelIndexBuilder: partitions a byte range into chunks, indexes each
// chunk concurrently with `rayon`, then reconciles quote state across
// chunk boundaries.
//
// The chunk-then-`rayon::par_iter`-then-merge shape is lifted straight from
// `strategy::parallel`'s `parse_csv_parallel_with_config`, generalized from
// "parse each row's fields in parallel" to "index each chunk's terminators
// in parallel, then fix up the handful of chunks whose quote state didn't
// close cleanly."

use rayon::prelude::*;

use crate::byte_source::ByteSource;
use crate::dialect::DialectConfig;
use crate::error::RaggedRowDiagnostic;
use crate::region_indexer::index_region;

pub fn recommended_threads() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

pub struct BuildOutput {
    pub offsets: Vec<usize>,
    pub rows: usize,
    pub columns: usize,
    pub ragged_rows: Vec<RaggedRowDiagnostic>,
    pub ending_in_quote: bool,
}

/// Splits `[start, size)` into roughly `num_threads` chunks on `\n`
/// boundaries. Every boundary except the first and last lands just after a
/// newline, so no chunk starts mid-record.
fn partition(data: &[u8], start: usize, num_threads: usize) -> Vec<(usize, usize)> {
    let size = data.len();
    if start >= size {
        return Vec::new();
    }
    let threads = num_threads.max(1);
    let approx = ((size - start) / threads).max(1);

    let mut bounds = Vec::with_capacity(threads + 1);
    bounds.push(start);
    for i in 1..threads {
        let target = start + approx * i;
        if target >= size {
            break;
        }
        let snapped = match memchr::memchr(b'\n', &data[target..]) {
            Some(nl) => target + nl + 1,
            None => size,
        };
        bounds.push(snapped.min(size));
    }
    bounds.push(size);
    bounds.dedup();

    bounds
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(s, e)| s < e)
        .collect()
}

/// Builds the flat, row-major offset vector for the byte range
/// `[header_start, data.len())` of `source`, honoring `dialect.num_threads`
/// and `dialect.n_max`.
pub fn build_index(
    source: &ByteSource,
    dialect: &DialectConfig,
    header_start: usize,
) -> BuildOutput {
    let data = source.data();
    if header_start >= data.len() {
        return BuildOutput {
            offsets: Vec::new(),
            rows: 0,
            columns: 0,
            ragged_rows: Vec::new(),
            ending_in_quote: false,
        };
    }

    let chunks = partition(data, header_start, dialect.num_threads);

    // Pass 1: index every chunk independently, assuming it opens outside a
    // quoted field. A chunk whose scan ends mid-quote has odd quote parity
    // and must be merged with its successor and re-scanned serially.
    let pass1: Vec<(Vec<usize>, crate::region_indexer::RegionResult)> = chunks
        .par_iter()
        .map(|&(s, e)| {
            let mut dest = Vec::new();
            let result = index_region(data, s, e, dialect, false, None, &mut dest);
            (dest, result)
        })
        .collect();

    let mut offsets = Vec::new();
    let mut i = 0;
    let mut final_ending_in_quote = false;
    while i < chunks.len() {
        if pass1[i].1.ending_in_quote {
            let mut j = i;
            while pass1[j].1.ending_in_quote && j + 1 < chunks.len() {
                j += 1;
            }
            let merged_start = chunks[i].0;
            let merged_end = chunks[j].1;
            log::debug!(
                "reconciling quote parity across chunks {}..={} ({}..{})",
                i, j, merged_start, merged_end
            );
            let mut dest = Vec::new();
            let result = index_region(data, merged_start, merged_end, dialect, false, None, &mut dest);
            offsets.extend(dest);
            final_ending_in_quote = result.ending_in_quote;
            i = j + 1;
        } else {
            offsets.extend_from_slice(&pass1[i].0);
            final_ending_in_quote = pass1[i].1.ending_in_quote;
            i += 1;
        }
    }

    let columns = determine_columns(data, &offsets);
    let (offsets, rows, ragged_rows) = if columns == 0 {
        (offsets, 0, Vec::new())
    } else {
        reconcile_ragged_rows(data, offsets, columns)
    };

    // `n_max` caps data rows (§6), but at this point `rows` still includes
    // the header row (the header/data split happens later, in
    // `SourceIndex::open`) -- so the cap applied here must account for it.
    let (offsets, rows) = if let Some(max) = dialect.n_max {
        let effective_max = max + dialect.has_header as usize;
        if columns > 0 && rows > effective_max {
            (offsets[..effective_max * columns].to_vec(), effective_max)
        } else {
            (offsets, rows)
        }
    } else {
        (offsets, rows)
    };

    BuildOutput {
        offsets,
        rows,
        columns,
        ragged_rows,
        ending_in_quote: final_ending_in_quote,
    }
}

fn determine_columns(data: &[u8], offsets: &[usize]) -> usize {
    let mut n = 0;
    for &off in offsets {
        n += 1;
        if data.get(off) == Some(&b'\n') {
            return n;
        }
    }
    n
}

/// Regroups the flat terminator list into fixed-width (`columns`-wide)
/// rows, padding short rows with empty trailing cells and folding extra
/// fields of long rows into the last retained column. See `RaggedRowPolicy`.
fn reconcile_ragged_rows(
    data: &[u8],
    raw_offsets: Vec<usize>,
    columns: usize,
) -> (Vec<usize>, usize, Vec<RaggedRowDiagnostic>) {
    let mut out = Vec::with_capacity(raw_offsets.len());
    let mut diagnostics = Vec::new();
    let mut rows = 0usize;
    let mut i = 0;

    while i < raw_offsets.len() {
        let row_start = i;
        loop {
            if i >= raw_offsets.len() {
                break;
            }
            let off = raw_offsets[i];
            i += 1;
            if data.get(off) == Some(&b'\n') {
                break;
            }
        }
        let row = &raw_offsets[row_start..i];
        let found = row.len();

        if found == columns {
            out.extend_from_slice(row);
        } else if found > columns {
            diagnostics.push(RaggedRowDiagnostic {
                row: rows,
                expected: columns,
                found,
            });
            out.extend_from_slice(&row[..columns - 1]);
            out.push(*row.last().unwrap());
        } else if found > 0 {
            diagnostics.push(RaggedRowDiagnostic {
                row: rows,
                expected: columns,
                found,
            });
            let terminator = *row.last().unwrap();
            out.extend_from_slice(row);
            for _ in found..columns {
                out.push(terminator);
            }
        } else {
            break;
        }
        rows += 1;
    }

    (out, rows, diagnostics)
}
