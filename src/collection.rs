// IndexCollection: virtual row-wise concatenation of multiple SourceIndex
// values, with column cursors that cross source boundaries transparently.
//
// `index_collection.h` in the original vroom sources models this with a
// polymorphic `base_iterator`/`full_iterator`/`subset_iterator` hierarchy.
// Per this crate's design notes, that's re-architected here as a closed,
// two-variant enum (`Full`/`Subset`) instead of virtual dispatch -- the set
// of shapes a column view can take is fixed and small, so a `match` covers
// it without a vtable.

use std::path::{Path, PathBuf};

use crate::cell::Cell;
use crate::dialect::DialectConfig;
use crate::error::{IndexError, Result};
use crate::source_index::SourceIndex;
use crate::views::RowView;

pub struct IndexCollection {
    sources: Vec<SourceIndex>,
    /// prefix[i] = total rows across sources[0..i]; prefix[sources.len()]
    /// is the grand total.
    prefix: Vec<usize>,
    columns: usize,
}

impl IndexCollection {
    pub fn open(paths: &[impl AsRef<Path>], dialect: DialectConfig) -> Result<Self> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(SourceIndex::open(path, dialect.clone())?);
        }
        Self::from_sources(sources)
    }

    pub fn from_sources(sources: Vec<SourceIndex>) -> Result<Self> {
        let columns = sources.first().map(|s| s.num_columns()).unwrap_or(0);
        for s in &sources {
            if s.num_columns() != columns {
                return Err(IndexError::SchemaMismatch(format!(
                    "{} has {} columns, expected {} (from {})",
                    s.filename().display(),
                    s.num_columns(),
                    columns,
                    sources[0].filename().display(),
                )));
            }
        }

        let mut prefix = Vec::with_capacity(sources.len() + 1);
        prefix.push(0);
        for s in &sources {
            let last = *prefix.last().unwrap();
            prefix.push(last + s.num_rows());
        }

        Ok(Self { sources, prefix, columns })
    }

    pub fn num_rows(&self) -> usize {
        *self.prefix.last().unwrap_or(&0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    pub fn filenames(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|s| s.filename().to_path_buf()).collect()
    }

    pub fn row_sizes(&self) -> Vec<usize> {
        self.sources.iter().map(|s| s.num_rows()).collect()
    }

    pub fn header(&self) -> Option<RowView<'_>> {
        self.sources.first().and_then(|s| s.header())
    }

    /// Maps a global row index to `(source index, row index within that source)`.
    fn locate(&self, global_row: usize) -> (usize, usize) {
        debug_assert!(global_row < self.num_rows());
        // partition_point finds the first prefix entry greater than global_row;
        // one less than that is the owning source.
        let idx = self.prefix.partition_point(|&p| p <= global_row) - 1;
        (idx, global_row - self.prefix[idx])
    }

    pub fn row(&self, global_row: usize) -> RowView<'_> {
        let (src, local) = self.locate(global_row);
        self.sources[src].row(local)
    }

    fn cell(&self, global_row: usize, col: usize) -> Cell<'_> {
        let (src, local) = self.locate(global_row);
        self.sources[src].get(local, col)
    }

    pub fn column(&self, col: usize) -> ColumnView<'_> {
        assert!(col < self.columns, "col {col} out of bounds ({})", self.columns);
        ColumnView {
            collection: self,
            col,
            shape: Shape::Full { len: self.num_rows() },
        }
    }
}

/// The two shapes a column view can take: the collection's full row range,
/// or an explicit row-index subset (used by `slice`/`subset`).
enum Shape {
    Full { len: usize },
    Subset { indices: Vec<usize> },
}

impl Shape {
    fn len(&self) -> usize {
        match self {
            Shape::Full { len } => *len,
            Shape::Subset { indices } => indices.len(),
        }
    }

    fn global_row(&self, i: usize) -> usize {
        match self {
            Shape::Full { .. } => i,
            Shape::Subset { indices } => indices[i],
        }
    }
}

pub struct ColumnView<'a> {
    collection: &'a IndexCollection,
    col: usize,
    shape: Shape,
}

impl<'a> ColumnView<'a> {
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Cell<'a> {
        let global_row = self.shape.global_row(i);
        self.collection.cell(global_row, self.col)
    }

    /// A view restricted to `[start, end)` of this view's rows.
    pub fn slice(&self, start: usize, end: usize) -> ColumnView<'a> {
        let end = end.min(self.len());
        let indices = (start..end).map(|i| self.shape.global_row(i)).collect();
        ColumnView {
            collection: self.collection,
            col: self.col,
            shape: Shape::Subset { indices },
        }
    }

    /// A view restricted to an explicit set of this view's row indices, in
    /// the order given.
    pub fn subset(&self, indices: &[usize]) -> ColumnView<'a> {
        let indices = indices.iter().map(|&i| self.shape.global_row(i)).collect();
        ColumnView {
            collection: self.collection,
            col: self.col,
            shape: Shape::Subset { indices },
        }
    }

    pub fn iter(&self) -> ColumnCursor<'a> {
        ColumnCursor {
            collection: self.collection,
            col: self.col,
            len: self.len(),
            indices: match &self.shape {
                Shape::Full { .. } => None,
                Shape::Subset { indices } => Some(indices.clone()),
            },
            front: 0,
            back: self.len(),
        }
    }
}

/// A bidirectional cursor over a column view's cells. Distinguishing
/// `Full` (implicit identity mapping) from `Subset` (an explicit index
/// list) avoids allocating an index vector for the common full-column
/// case. Comparable (`PartialEq`) and supports `distance_to`, mirroring
/// the original `base_iterator::equal_to`/`distance_to` pair.
#[derive(Clone)]
pub struct ColumnCursor<'a> {
    collection: &'a IndexCollection,
    col: usize,
    len: usize,
    indices: Option<Vec<usize>>,
    front: usize,
    back: usize,
}

impl<'a> ColumnCursor<'a> {
    fn global_row(&self, i: usize) -> usize {
        match &self.indices {
            None => i,
            Some(indices) => indices[i],
        }
    }

    pub fn at(&self, i: usize) -> Cell<'a> {
        self.collection.cell(self.global_row(i), self.col)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Signed number of positions from `self`'s current front to `other`'s,
    /// mirroring the original `base_iterator::distance_to`. Only meaningful
    /// for cursors over the same column view; panics otherwise.
    pub fn distance_to(&self, other: &ColumnCursor<'a>) -> isize {
        assert!(
            std::ptr::eq(self.collection, other.collection) && self.col == other.col,
            "distance_to requires cursors over the same column view"
        );
        other.front as isize - self.front as isize
    }
}

impl<'a> PartialEq for ColumnCursor<'a> {
    /// Two cursors are equal when they walk the same column view (same
    /// collection, column, and row subset) and sit at the same position.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.collection, other.collection)
            && self.col == other.col
            && self.indices == other.indices
            && self.front == other.front
    }
}

impl<'a> Iterator for ColumnCursor<'a> {
    type Item = Cell<'a>;

    fn next(&mut self) -> Option<Cell<'a>> {
        if self.front >= self.back {
            return None;
        }
        let cell = self.at(self.front);
        self.front += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a> DoubleEndedIterator for ColumnCursor<'a> {
    fn next_back(&mut self) -> Option<Cell<'a>> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.at(self.back))
    }
}

impl<'a> ExactSizeIterator for ColumnCursor<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectConfig;
    use std::io::Write;

    fn write_source(bytes: &[u8]) -> SourceIndex {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        // Keep the tempfile alive for the duration of the test by leaking
        // it into the index's lifetime via into_temp_path -> persist is
        // unnecessary here since SourceIndex mmaps the data eagerly.
        let index = SourceIndex::open(f.path(), DialectConfig::default()).unwrap();
        index
    }

    #[test]
    fn concatenates_rows_across_sources() {
        let a = write_source(b"h1,h2\n1,2\n3,4\n");
        let b = write_source(b"h1,h2\n5,6\n");
        let collection = IndexCollection::from_sources(vec![a, b]).unwrap();
        assert_eq!(collection.num_rows(), 3);
        assert_eq!(collection.row(0).get(0).bytes(), b"1");
        assert_eq!(collection.row(2).get(0).bytes(), b"5");
    }

    #[test]
    fn rejects_schema_mismatch() {
        let a = write_source(b"h1,h2\n1,2\n");
        let b = write_source(b"h1,h2,h3\n5,6,7\n");
        let err = IndexCollection::from_sources(vec![a, b]).unwrap_err();
        assert!(matches!(err, IndexError::SchemaMismatch(_)));
    }

    #[test]
    fn column_cursor_crosses_source_boundary() {
        let a = write_source(b"h\n1\n2\n");
        let b = write_source(b"h\n3\n4\n");
        let collection = IndexCollection::from_sources(vec![a, b]).unwrap();
        let values: Vec<_> = collection
            .column(0)
            .iter()
            .map(|c| c.bytes().to_vec())
            .collect();
        assert_eq!(values, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec(), b"4".to_vec()]);
    }

    #[test]
    fn column_cursor_is_double_ended() {
        let a = write_source(b"h\n1\n2\n3\n");
        let collection = IndexCollection::from_sources(vec![a]).unwrap();
        let mut iter = collection.column(0).iter();
        assert_eq!(iter.next().unwrap().bytes(), b"1");
        assert_eq!(iter.next_back().unwrap().bytes(), b"3");
        assert_eq!(iter.next().unwrap().bytes(), b"2");
        assert!(iter.next().is_none());
    }

    #[test]
    fn column_cursor_equality_and_distance() {
        let a = write_source(b"h\n1\n2\n3\n4\n");
        let collection = IndexCollection::from_sources(vec![a]).unwrap();
        let col = collection.column(0);
        let mut lead = col.iter();
        let trail = col.iter();
        assert_eq!(lead, trail);
        assert_eq!(lead.distance_to(&trail), 0);

        lead.next();
        lead.next();
        assert_ne!(lead, trail);
        assert_eq!(trail.distance_to(&lead), 2);
        assert_eq!(lead.distance_to(&trail), -2);
    }

    #[test]
    fn column_slice_and_subset() {
        let a = write_source(b"h\n1\n2\n3\n4\n");
        let collection = IndexCollection::from_sources(vec![a]).unwrap();
        let col = collection.column(0);
        let sliced = col.slice(1, 3);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.get(0).bytes(), b"2");

        let subset = col.subset(&[3, 0]);
        assert_eq!(subset.get(0).bytes(), b"4");
        assert_eq!(subset.get(1).bytes(), b"1");
    }
}
