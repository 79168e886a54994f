//! The cell store behind a document.
//!
//! Cells live by value in one insertion-ordered vector and carry their own coordinates.
//! Everything else (row count, rows grouped by coordinate, row and column key lookups) is
//! derived from that vector and cached until the next structural change.

use super::cache::Cached;
use crate::Position;
use bitvec::prelude::*;
use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, trace};

type Mask = BitVec<u64, Lsb0>;

/// One logical table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    data: String,
    column: usize,
    row: usize,
}

impl Cell {
    pub(crate) fn new(data: String, column: usize, row: usize) -> Self {
        Self { data, column, row }
    }

    /// The unescaped value
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn position(&self) -> Position {
        Position {
            row: self.row,
            column: self.column,
        }
    }
}

/// All cells of a document, with lazily maintained indexes.
///
/// Row coordinates only ever grow through [`Grid::push_row`] and are only renumbered by
/// [`Grid::repair_broken_rows`], so a grid built through this API has no row gaps.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: Vec<Cell>,
    count: Cached<usize>,
    rows: Cached<Vec<Vec<usize>>>,
    columns: Cached<Vec<Vec<usize>>>,
    row_keys: Cached<HashMap<String, usize>>,
    column_keys: Cached<HashMap<String, usize>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from already unescaped rows, numbering them from 0.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = String>,
    {
        let cells = rows
            .into_iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .into_iter()
                    .enumerate()
                    .map(move |(column, data)| Cell::new(data, column, row))
            })
            .collect();
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Every cell, in insertion order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// One past the highest row coordinate, or 0 for an empty grid.
    pub fn row_count(&self) -> usize {
        *self.count.get_or_update(|| {
            trace!(cells = self.cells.len(), "recounting rows");
            self.cells.iter().map(|cell| cell.row + 1).max().unwrap_or(0)
        })
    }

    /// One past the highest column coordinate, or 0 for an empty grid.
    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Append values as a new row after the last one and return its index.
    ///
    /// Every non-empty row raises the row count by exactly one. An empty row is the
    /// exception: it adds no cells, and since the count is derived from cell coordinates it
    /// stays the same. The returned index is then the one the next row will take.
    pub fn push_row<I: IntoIterator<Item = String>>(&mut self, values: I) -> usize {
        let row = self.row_count();
        let before = self.cells.len();
        self.cells.extend(
            values
                .into_iter()
                .enumerate()
                .map(|(column, data)| Cell::new(data, column, row)),
        );
        let pushed = self.cells.len() > before;
        self.invalidate();
        self.count.set(if pushed { row + 1 } else { row });
        row
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.count.invalidate();
        self.rows.invalidate();
        self.columns.invalidate();
        self.row_keys.invalidate();
        self.column_keys.invalidate();
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Cell indexes of every row, each ordered by column
    pub(crate) fn rows(&self) -> &[Vec<usize>] {
        self.rows.get_or_update(|| {
            trace!(cells = self.cells.len(), "grouping rows");
            self.group_lines(self.row_count(), |cell| cell.row, |cell| cell.column)
        })
    }

    /// Cell indexes of every column, each ordered by row
    pub(crate) fn columns(&self) -> &[Vec<usize>] {
        self.columns.get_or_update(|| {
            trace!(cells = self.cells.len(), "grouping columns");
            let count = self.cells.iter().map(|cell| cell.column + 1).max().unwrap_or(0);
            self.group_lines(count, |cell| cell.column, |cell| cell.row)
        })
    }

    fn group_lines(
        &self,
        count: usize,
        line: impl Fn(&Cell) -> usize,
        order: impl Fn(&Cell) -> usize,
    ) -> Vec<Vec<usize>> {
        let mut lines = vec![Vec::new(); count];
        for (index, cell) in self.cells.iter().enumerate() {
            lines[line(cell)].push(index);
        }
        for members in &mut lines {
            // Stable, so duplicate coordinates keep their insertion order
            members.sort_by_key(|&index| order(&self.cells[index]));
        }
        lines
    }

    /// The row whose first cell holds `key`. The first such cell inserted wins.
    pub fn row_of_key(&self, key: &str) -> Option<usize> {
        self.row_keys
            .get_or_update(|| {
                trace!("indexing row keys");
                let mut keys = HashMap::new();
                for cell in self.cells.iter().filter(|cell| cell.column == 0) {
                    keys.entry(cell.data.clone()).or_insert(cell.row);
                }
                keys
            })
            .get(key)
            .copied()
    }

    /// The header cell in row 0 holding `key`. Later duplicate headers are shadowed.
    pub fn column_key_cell(&self, key: &str) -> Option<&Cell> {
        self.column_keys
            .get_or_update(|| {
                trace!("indexing column keys");
                let mut keys = HashMap::new();
                for (index, cell) in self.cells.iter().enumerate() {
                    if cell.row == 0 {
                        keys.entry(cell.data.clone()).or_insert(index);
                    }
                }
                keys
            })
            .get(key)
            .map(|&index| &self.cells[index])
    }

    /// The column whose header in row 0 holds `key`.
    pub fn column_of_key(&self, key: &str) -> Option<usize> {
        self.column_key_cell(key).map(Cell::column)
    }

    /// Keep only rows of the most common width and renumber them from 0.
    ///
    /// Widths compete by how many rows have them; on a tie the width seen first in row
    /// order wins. This throws data away and cannot be undone. Returns how many rows were
    /// dropped.
    pub fn repair_broken_rows(&mut self) -> usize {
        let rows = self.rows().to_vec();
        let widths = rows.iter().map(Vec::len).collect::<Vec<_>>();
        let counts = widths.iter().counts();
        let Some(&width) = widths
            .iter()
            .unique()
            .min_by_key(|width| Reverse(counts[width]))
        else {
            return 0;
        };

        let mut keep: Mask = bitvec![u64, Lsb0; 0; rows.len()];
        for (row, &row_width) in widths.iter().enumerate() {
            keep.set(row, row_width == width);
        }

        let mut cells = std::mem::take(&mut self.cells);
        let mut survivors = Vec::with_capacity(keep.count_ones() * width);
        for (new_row, old_row) in keep.iter_ones().enumerate() {
            for &index in &rows[old_row] {
                let data = std::mem::take(&mut cells[index].data);
                survivors.push(Cell::new(data, cells[index].column, new_row));
            }
        }
        self.cells = survivors;
        self.invalidate();

        let dropped = keep.count_zeros();
        debug!(width, kept = keep.count_ones(), dropped, "repaired broken rows");
        dropped
    }
}
