//! Read, edit and write delimited text tables.
//!
//! The format is the single-character-delimiter, optional-quote dialect: one row per
//! physical line, fields separated by a configurable delimiter and optionally wrapped in
//! a configurable quote character, with doubled quotes standing for a literal quote.
pub mod csv;
mod errors;

pub use crate::csv::{
    cache::Cached,
    codec::{parse, render, ALTERNATE_QUOTE, DEFAULT_DELIMITER, DEFAULT_QUOTE},
    document::Document,
    grid::{Cell, Grid},
    options::FormatConfig,
    record::{CellValue, Record},
    rows::{Column, Row, Rows},
    split::{split_line, stream_rows},
};
pub use crate::errors::{CsvError, Result};

/// A (row, column) coordinate in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}
