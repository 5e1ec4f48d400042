// Small row/column view types shared by `SourceIndex` and `IndexCollection`.

use crate::cell::Cell;

/// A materialized row of cells. Rows are narrow enough in practice
/// (column counts, not row counts) that eagerly collecting them is
/// simpler than a lazy iterator and just as cheap.
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    cells: Vec<Cell<'a>>,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(cells: Vec<Cell<'a>>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, col: usize) -> Cell<'a> {
        self.cells[col]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell<'a>> {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for RowView<'a> {
    type Item = Cell<'a>;
    type IntoIter = std::vec::IntoIter<Cell<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}
