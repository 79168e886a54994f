//! Store plain structs as key/value tables.
//!
//! A [`Record`] lists its fields by name; each field is a [`CellValue`] that can be turned
//! into a cell string and set back from one. A document holds one row per field:
//! the name in the first cell and the value in the last.

use crate::errors::{CsvError, Result};
use std::str::FromStr;

/// A value that can live in a single cell.
pub trait CellValue {
    fn get_string_value(&self) -> String;

    fn set_value_from_string(&mut self, value: &str) -> Result<()>;
}

impl CellValue for String {
    fn get_string_value(&self) -> String {
        self.clone()
    }

    fn set_value_from_string(&mut self, value: &str) -> Result<()> {
        value.clone_into(self);
        Ok(())
    }
}

macro_rules! cell_value_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CellValue for $ty {
                fn get_string_value(&self) -> String {
                    self.to_string()
                }

                fn set_value_from_string(&mut self, value: &str) -> Result<()> {
                    *self = <$ty>::from_str(value).map_err(|error| CsvError::Value {
                        field: stringify!($ty).to_string(),
                        value: value.to_string(),
                        reason: error.to_string(),
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

cell_value_from_str!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

/// A struct whose named fields can be written to and read from a document.
///
/// ```
/// use cellgrid::{CellValue, Record};
///
/// #[derive(Default)]
/// struct Settings {
///     host: String,
///     port: u16,
/// }
///
/// impl Record for Settings {
///     fn field_names() -> &'static [&'static str] {
///         &["host", "port"]
///     }
///
///     fn field(&self, name: &str) -> Option<&dyn CellValue> {
///         match name {
///             "host" => Some(&self.host),
///             "port" => Some(&self.port),
///             _ => None,
///         }
///     }
///
///     fn field_mut(&mut self, name: &str) -> Option<&mut dyn CellValue> {
///         match name {
///             "host" => Some(&mut self.host),
///             "port" => Some(&mut self.port),
///             _ => None,
///         }
///     }
/// }
///
/// let mut document = cellgrid::Document::default();
/// document.serialize_record(&Settings { host: "example.org".into(), port: 8080 });
/// assert_eq!(document.to_text(), "host;example.org\nport;8080".replace('\n', document.config().line_terminator()));
///
/// let settings: Settings = document.deserialize_record().unwrap();
/// assert_eq!(settings.port, 8080);
/// ```
pub trait Record {
    fn field_names() -> &'static [&'static str];

    fn field(&self, name: &str) -> Option<&dyn CellValue>;

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn CellValue>;
}

/// Name the failing field in a [`CsvError::Value`] raised by a bare value type.
pub(crate) fn for_field(error: CsvError, name: &str) -> CsvError {
    match error {
        CsvError::Value { value, reason, .. } => CsvError::Value {
            field: name.to_string(),
            value,
            reason,
        },
        other => other,
    }
}
