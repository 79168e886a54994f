use super::codec::{DEFAULT_DELIMITER, DEFAULT_QUOTE};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Line terminator written between rows.
#[cfg(windows)]
pub const DEFAULT_LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const DEFAULT_LINE_TERMINATOR: &str = "\n";

/// The dialect and I/O settings of one document.
///
/// Settings are fixed once the config is handed to a [`Document`](super::document::Document).
/// The encoding is stored by reference to an `encoding_rs` static and (de)serialized by its
/// WHATWG label, so a config can be embedded in a host application's own settings file:
///
/// ```
/// let config: cellgrid::FormatConfig =
///     serde_json::from_str(r#"{ "delimiter": ",", "encoding": "windows-1251" }"#).unwrap();
/// assert_eq!(config.delimiter(), ',');
/// assert_eq!(config.encoding(), encoding_rs::WINDOWS_1251);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    delimiter: char,
    quote: char,
    swap_quotes: bool,
    row_limit: usize,
    #[serde(with = "encoding_label")]
    encoding: &'static Encoding,
    line_terminator: String,
    line_filters: Vec<String>,
    column_count_filter: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            swap_quotes: false,
            row_limit: 0,
            encoding: encoding_rs::UTF_8,
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
            line_filters: Vec::new(),
            column_count_filter: 0,
        }
    }
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field separator
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Character wrapping fields that need quoting
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Replace the alternate quote instead of doubling the configured one when writing
    pub fn with_swap_quotes(mut self, swap_quotes: bool) -> Self {
        self.swap_quotes = swap_quotes;
        self
    }

    /// Stop loading after this many rows; 0 means unlimited
    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_line_terminator(mut self, line_terminator: impl Into<String>) -> Self {
        self.line_terminator = line_terminator.into();
        self
    }

    /// Skip every input line containing one of these substrings
    pub fn with_line_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_filters = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Skip every input line that does not split into exactly this many fields; 0 disables
    pub fn with_column_count_filter(mut self, column_count: usize) -> Self {
        self.column_count_filter = column_count;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    pub fn swap_quotes(&self) -> bool {
        self.swap_quotes
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    pub fn line_filters(&self) -> &[String] {
        &self.line_filters
    }

    pub fn column_count_filter(&self) -> usize {
        self.column_count_filter
    }

    /// Whether the row limit allows a row with this index to be retained
    pub(crate) fn admits_row(&self, row: usize) -> bool {
        self.row_limit == 0 || row < self.row_limit
    }

    /// Whether a raw line passes the line filters
    pub(crate) fn admits_line(&self, line: &str) -> bool {
        !self.line_filters.iter().any(|filter| line.contains(filter.as_str()))
    }

    /// Whether a split line passes the column count filter
    pub(crate) fn admits_width(&self, width: usize) -> bool {
        self.column_count_filter == 0 || width == self.column_count_filter
    }
}

mod encoding_label {
    use encoding_rs::Encoding;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        encoding: &&'static Encoding,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(encoding.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static Encoding, D::Error> {
        let label = String::deserialize(deserializer)?;
        Encoding::for_label(label.as_bytes())
            .ok_or_else(|| D::Error::custom(format!("unknown encoding label {label:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormatConfig::default();
        assert_eq!(config.delimiter(), ';');
        assert_eq!(config.quote(), '"');
        assert!(!config.swap_quotes());
        assert_eq!(config.row_limit(), 0);
        assert_eq!(config.encoding(), encoding_rs::UTF_8);
        assert_eq!(config.line_terminator(), DEFAULT_LINE_TERMINATOR);
    }

    #[test]
    fn test_builder() {
        let config = FormatConfig::new()
            .with_delimiter(',')
            .with_quote('\'')
            .with_swap_quotes(true)
            .with_row_limit(10)
            .with_line_terminator("\r\n")
            .with_line_filters(["#"])
            .with_column_count_filter(3);
        assert_eq!(config.delimiter(), ',');
        assert_eq!(config.quote(), '\'');
        assert!(config.swap_quotes());
        assert_eq!(config.row_limit(), 10);
        assert_eq!(config.line_terminator(), "\r\n");
        assert_eq!(config.line_filters(), ["#".to_string()]);
        assert_eq!(config.column_count_filter(), 3);
    }

    #[test]
    fn test_admission() {
        let config = FormatConfig::new()
            .with_row_limit(2)
            .with_line_filters(["skip"])
            .with_column_count_filter(3);
        assert!(config.admits_row(1));
        assert!(!config.admits_row(2));
        assert!(!config.admits_line("please skip me"));
        assert!(config.admits_line("keep me"));
        assert!(config.admits_width(3));
        assert!(!config.admits_width(2));

        let unlimited = FormatConfig::default();
        assert!(unlimited.admits_row(usize::MAX - 1));
        assert!(unlimited.admits_width(17));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = FormatConfig::new()
            .with_delimiter('\t')
            .with_encoding(encoding_rs::SHIFT_JIS);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"Shift_JIS\""));
        let back: FormatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_serde_unknown_encoding() {
        let result = serde_json::from_str::<FormatConfig>(r#"{ "encoding": "klingon" }"#);
        assert!(result.unwrap_err().to_string().contains("klingon"));
    }

    #[test]
    fn test_serde_missing_fields_default() {
        let config: FormatConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FormatConfig::default());
    }
}
