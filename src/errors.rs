use crate::Position;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(io::Error),

    #[error("Input is not valid {encoding}")]
    Decode { encoding: &'static str },

    #[error("Text cannot be represented in {encoding}")]
    Encode { encoding: &'static str },

    #[error("No row is keyed by {0:?}")]
    RowKeyNotFound(String),

    #[error("No column is keyed by {0:?}")]
    ColumnKeyNotFound(String),

    #[error("Row {index} is out of range ({count} rows)")]
    RowOutOfRange { index: usize, count: usize },

    #[error("No cell at {0:?}")]
    CellNotFound(Position),

    #[error("Cannot set field {field:?} from {value:?}: {reason}")]
    Value {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<io::Error> for CsvError {
    fn from(error: io::Error) -> Self {
        CsvError::Io(error)
    }
}

pub type Result<T> = std::result::Result<T, CsvError>;
