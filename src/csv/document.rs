use super::codec;
use super::grid::{Cell, Grid};
use super::options::FormatConfig;
use super::record::{self, Record};
use super::rows::{Column, Row, Rows};
use super::split::{physical_lines, split_line};
use crate::errors::{CsvError, Result};
use crate::Position;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use itertools::Itertools;
use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, trace};

/// A table together with the format it is read and written in.
///
/// ```
/// use cellgrid::{Document, FormatConfig};
///
/// let document = Document::load_from_str("123;456;789\r\nasd;fgh;jkl", FormatConfig::default());
/// assert_eq!(document.row_count(), 2);
/// assert_eq!(document.row_by_index(1).unwrap()[1].data(), "fgh");
/// assert_eq!(document.row_by_key("asd").unwrap()[1].data(), "fgh");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    config: FormatConfig,
    grid: Grid,
}

impl Document {
    /// An empty document
    pub fn new(config: FormatConfig) -> Self {
        Self {
            config,
            grid: Grid::new(),
        }
    }

    /// Read all bytes from `reader` and parse them.
    pub fn load<R: Read>(mut reader: R, config: FormatConfig) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load_from_bytes(&bytes, config)
    }

    pub fn load_from_file(path: impl AsRef<Path>, config: FormatConfig) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::load_from_bytes(&bytes, config)
    }

    /// Decode with the configured encoding, then parse.
    ///
    /// A byte order mark is dropped. Bytes that are not valid in the encoding are an
    /// error, never replaced.
    pub fn load_from_bytes(bytes: &[u8], config: FormatConfig) -> Result<Self> {
        let encoding = config.encoding();
        let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(CsvError::Decode {
                encoding: encoding.name(),
            });
        }
        Ok(Self::load_from_str(&text, config))
    }

    /// Parse already decoded text.
    ///
    /// Each retained line becomes one row, numbered in order from 0. Lines rejected by the
    /// line or column count filters are skipped without taking a row number, and reading
    /// stops once the row limit is reached.
    pub fn load_from_str(text: &str, config: FormatConfig) -> Self {
        let mut rows = Vec::new();
        for line in physical_lines(text) {
            if !config.admits_row(rows.len()) {
                break;
            }
            if !config.admits_line(line) {
                trace!(line, "line filtered out");
                continue;
            }
            let tokens = split_line(line, config.delimiter(), config.quote());
            if !config.admits_width(tokens.len()) {
                trace!(line, width = tokens.len(), "line has the wrong width");
                continue;
            }
            rows.push(
                tokens
                    .iter()
                    .map(|token| codec::parse(token, &config))
                    .collect::<Vec<_>>(),
            );
        }

        let grid = Grid::from_rows(rows);
        debug!(
            rows = grid.row_count(),
            cells = grid.len(),
            encoding = config.encoding().name(),
            "loaded document"
        );
        Self { config, grid }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Render every row, joined by the line terminator, with no terminator after the last.
    pub fn to_text(&self) -> String {
        let delimiter = self.config.delimiter().to_string();
        self.grid
            .rows_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| codec::render(cell.data(), &self.config))
                    .join(&delimiter)
            })
            .join(self.config.line_terminator())
    }

    /// Encode the rendered text and write it to `writer`.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let text = self.to_text();
        let bytes = encode_text(&text, self.config.encoding())?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        debug!(rows = self.row_count(), bytes = bytes.len(), "saved document");
        Ok(())
    }

    /// Save to `path`, creating missing parent directories first.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        self.save(BufWriter::new(fs::File::create(path)?))
    }

    /// Append values as a new last row.
    ///
    /// Each value is read the way a field token would be, so a value wrapped in quotes
    /// loses them. Appending no values adds no cells, so unlike every other append the row
    /// count stays the same.
    pub fn append_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = &self.config;
        let row = self.grid.push_row(
            values
                .into_iter()
                .map(|value| codec::parse(value.as_ref(), config)),
        );
        trace!(row, "appended row");
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        debug!("cleared document");
    }

    /// Drop every row whose width differs from the most common one. Returns how many rows
    /// were dropped.
    pub fn repair_broken_rows(&mut self) -> usize {
        self.grid.repair_broken_rows()
    }

    /// One past the highest row index
    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn rows(&self) -> Rows<'_> {
        self.grid.rows_iter()
    }

    pub fn row_by_index(&self, index: usize) -> Result<Row<'_>> {
        self.grid.row(index).ok_or(CsvError::RowOutOfRange {
            index,
            count: self.row_count(),
        })
    }

    /// The first row whose first cell holds `key`.
    pub fn row_by_key(&self, key: &str) -> Result<Row<'_>> {
        self.try_row_by_key(key)
            .ok_or_else(|| CsvError::RowKeyNotFound(key.to_string()))
    }

    pub fn try_row_by_key(&self, key: &str) -> Option<Row<'_>> {
        self.grid.row_by_key(key)
    }

    pub fn has_row_key(&self, key: &str) -> bool {
        self.grid.row_of_key(key).is_some()
    }

    /// The cell in `row` under the header holding `key`.
    pub fn cell_by_column_key(&self, row: usize, key: &str) -> Result<&Cell> {
        let column = self
            .grid
            .column_of_key(key)
            .ok_or_else(|| CsvError::ColumnKeyNotFound(key.to_string()))?;
        self.grid
            .row(row)
            .and_then(|view| view.get(column))
            .ok_or(CsvError::CellNotFound(Position { row, column }))
    }

    pub fn try_cell_by_column_key(&self, row: usize, key: &str) -> Option<&Cell> {
        let column = self.grid.column_of_key(key)?;
        self.grid.row(row)?.get(column)
    }

    pub fn column_by_index(&self, index: usize) -> Option<Column<'_>> {
        self.grid.column(index)
    }

    /// The column whose row-0 header holds `key`.
    pub fn column_by_key(&self, key: &str) -> Result<Column<'_>> {
        self.try_column_by_key(key)
            .ok_or_else(|| CsvError::ColumnKeyNotFound(key.to_string()))
    }

    pub fn try_column_by_key(&self, key: &str) -> Option<Column<'_>> {
        self.grid.column_by_key(key)
    }

    /// Append one `[name, value]` row per field of `record`.
    ///
    /// Values are stored as given, without the unquoting [`Document::append_row`] applies.
    pub fn serialize_record<T: Record>(&mut self, record: &T) {
        for &name in T::field_names() {
            if let Some(value) = record.field(name) {
                self.grid
                    .push_row([name.to_string(), value.get_string_value()]);
            }
        }
        debug!(fields = T::field_names().len(), "serialized record");
    }

    /// Build a `T` from rows whose first cell names one of its fields; the last cell of such
    /// a row holds the value. Other rows are ignored.
    pub fn deserialize_record<T: Record + Default>(&self) -> Result<T> {
        let mut result = T::default();
        for row in self.rows() {
            let (Some(name), Some(value)) = (row.first(), row.last()) else {
                continue;
            };
            if let Some(field) = result.field_mut(name.data()) {
                field
                    .set_value_from_string(value.data())
                    .map_err(|error| record::for_field(error, name.data()))?;
            }
        }
        Ok(result)
    }
}

/// Encode `text` for writing.
///
/// `Encoding::encode` writes UTF-16 as UTF-8, so the two UTF-16 encodings are built by hand.
fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Result<Cow<'a, [u8]>> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
            let pair = if encoding == UTF_16LE {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            bytes.extend_from_slice(&pair);
        }
        return Ok(Cow::Owned(bytes));
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(CsvError::Encode {
            encoding: encoding.name(),
        });
    }
    Ok(bytes)
}
