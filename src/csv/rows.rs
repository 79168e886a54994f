//! Read-only row and column projections over a [`Grid`].
//!
//! Views borrow the grid and the member lists from its caches, so they are cheap to make
//! and cannot outlive the next mutation.

use super::grid::{Cell, Grid};
use crate::errors::{CsvError, Result};
use crate::Position;
use std::ops::Index;

/// The cells sharing one row coordinate, ordered by column.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    grid: &'a Grid,
    index: usize,
    members: &'a [usize],
}

impl<'a> Row<'a> {
    fn new(grid: &'a Grid, index: usize) -> Self {
        let members = grid.rows().get(index).map(Vec::as_slice).unwrap_or(&[]);
        Self {
            grid,
            index,
            members,
        }
    }

    /// Row coordinate
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Cell> + 'a {
        let (grid, members) = (self.grid, self.members);
        members.iter().map(move |&index| grid.cell_at(index))
    }

    pub fn values(&self) -> Vec<&'a str> {
        self.iter().map(Cell::data).collect()
    }

    /// The key cell of this row
    pub fn first(&self) -> Option<&'a Cell> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&'a Cell> {
        let grid = self.grid;
        self.members.last().map(|&index| grid.cell_at(index))
    }

    pub fn get(&self, column: usize) -> Option<&'a Cell> {
        self.iter().find(|cell| cell.column() == column)
    }

    pub fn cell(&self, column: usize) -> Result<&'a Cell> {
        self.get(column).ok_or(CsvError::CellNotFound(Position {
            row: self.index,
            column,
        }))
    }

    /// The cell under the header holding `key` in row 0.
    pub fn get_by_key(&self, key: &str) -> Option<&'a Cell> {
        self.get(self.grid.column_of_key(key)?)
    }

    pub fn cell_by_key(&self, key: &str) -> Result<&'a Cell> {
        let column = self
            .grid
            .column_of_key(key)
            .ok_or_else(|| CsvError::ColumnKeyNotFound(key.to_string()))?;
        self.cell(column)
    }
}

impl<'a> Index<usize> for Row<'a> {
    type Output = Cell;

    fn index(&self, column: usize) -> &Cell {
        match self.get(column) {
            Some(cell) => cell,
            None => panic!("no cell in column {column} of row {}", self.index),
        }
    }
}

impl<'a> IntoIterator for Row<'a> {
    type Item = &'a Cell;
    type IntoIter = Box<dyn Iterator<Item = &'a Cell> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// The cells sharing one column coordinate, ordered by row.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    grid: &'a Grid,
    index: usize,
    members: &'a [usize],
}

impl<'a> Column<'a> {
    fn new(grid: &'a Grid, index: usize) -> Self {
        let members = grid.columns().get(index).map(Vec::as_slice).unwrap_or(&[]);
        Self {
            grid,
            index,
            members,
        }
    }

    /// Column coordinate
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Cell> + 'a {
        let (grid, members) = (self.grid, self.members);
        members.iter().map(move |&index| grid.cell_at(index))
    }

    pub fn values(&self) -> Vec<&'a str> {
        self.iter().map(Cell::data).collect()
    }

    pub fn get(&self, row: usize) -> Option<&'a Cell> {
        self.iter().find(|cell| cell.row() == row)
    }
}

/// Iterator over every row index `0..row_count`, gaps included as empty rows.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    grid: &'a Grid,
    next: usize,
    end: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Row<'a>> {
        if self.next >= self.end {
            return None;
        }
        let row = Row::new(self.grid, self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

impl Grid {
    pub fn rows_iter(&self) -> Rows<'_> {
        Rows {
            grid: self,
            next: 0,
            end: self.row_count(),
        }
    }

    /// The row at `index`, if it is below the row count.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count()).then(|| Row::new(self, index))
    }

    /// The first row whose first cell holds `key`.
    pub fn row_by_key(&self, key: &str) -> Option<Row<'_>> {
        self.row_of_key(key).map(|index| Row::new(self, index))
    }

    pub fn column(&self, index: usize) -> Option<Column<'_>> {
        (index < self.column_count()).then(|| Column::new(self, index))
    }

    /// The column whose row-0 header holds `key`.
    pub fn column_by_key(&self, key: &str) -> Option<Column<'_>> {
        self.column_of_key(key).map(|index| Column::new(self, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_rows([
            vec!["id".to_string(), "name".to_string(), "name".to_string()],
            vec!["1".to_string(), "ann".to_string(), "x".to_string()],
            vec!["2".to_string(), "bob".to_string()],
        ])
    }

    #[test]
    fn test_row_view() {
        let grid = grid();
        let row = grid.row(1).unwrap();
        assert_eq!(row.index(), 1);
        assert_eq!(row.len(), 3);
        assert_eq!(row.values(), vec!["1", "ann", "x"]);
        assert_eq!(row[1].data(), "ann");
        assert_eq!(row.first().unwrap().data(), "1");
        assert_eq!(row.last().unwrap().data(), "x");
        assert!(grid.row(3).is_none());
    }

    #[test]
    fn test_row_missing_cell() {
        let grid = grid();
        let row = grid.row(2).unwrap();
        assert!(row.get(2).is_none());
        assert!(matches!(
            row.cell(2),
            Err(CsvError::CellNotFound(Position { row: 2, column: 2 }))
        ));
    }

    #[test]
    fn test_row_by_column_key() {
        let grid = grid();
        let row = grid.row_by_key("2").unwrap();
        assert_eq!(row.get_by_key("name").unwrap().data(), "bob");
        // The shadowed duplicate header is never reached
        assert_eq!(grid.row(1).unwrap().cell_by_key("name").unwrap().data(), "ann");
        assert!(matches!(
            row.cell_by_key("age"),
            Err(CsvError::ColumnKeyNotFound(key)) if key == "age"
        ));
        assert!(row.get_by_key("age").is_none());
    }

    #[test]
    fn test_rows_iter() {
        let grid = grid();
        let rows = grid.rows_iter();
        assert_eq!(rows.len(), 3);
        let widths: Vec<_> = rows.map(|row| row.len()).collect();
        assert_eq!(widths, vec![3, 3, 2]);
        let all: Vec<_> = grid.rows_iter().flatten().map(Cell::data).collect();
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_column_view() {
        let grid = grid();
        let column = grid.column_by_key("name").unwrap();
        assert_eq!(column.index(), 1);
        assert_eq!(column.values(), vec!["name", "ann", "bob"]);
        assert_eq!(column.get(2).unwrap().data(), "bob");
        let last = grid.column(2).unwrap();
        assert_eq!(last.len(), 2);
        assert!(last.get(2).is_none());
        assert!(grid.column(3).is_none());
        assert!(grid.column_by_key("age").is_none());
    }
}
