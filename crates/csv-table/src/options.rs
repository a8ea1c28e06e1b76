//! CSV read options.

/// How rows whose field count differs from the header are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Pad short rows with nulls and drop extra fields
    #[default]
    Permissive,
    /// Fail on the first malformed row
    FailFast,
}

impl ParseMode {
    /// Value of the engine's `mode` reader option
    pub fn as_engine_value(&self) -> &'static str {
        match self {
            ParseMode::Permissive => "PERMISSIVE",
            ParseMode::FailFast => "FAILFAST",
        }
    }
}

/// Options for reading a delimited text file as a table
///
/// The defaults read the first row as the header, use `"` both as the quote
/// and the escape character, and let quoted values span physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadOptions {
    /// Whether the first row holds column names (default: true)
    pub header: bool,

    /// Field delimiter (default: ',')
    pub delimiter: u8,

    /// Quote character (default: '"')
    pub quote: u8,

    /// Escape character inside quoted values (default: '"')
    ///
    /// When equal to `quote`, an escaped quote is written as a doubled quote.
    pub escape: u8,

    /// Whether quoted values may contain line breaks (default: true)
    pub multi_line: bool,

    /// Malformed row handling (default: permissive)
    pub mode: ParseMode,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: b',',
            quote: b'"',
            escape: b'"',
            multi_line: true,
            mode: ParseMode::Permissive,
        }
    }
}

impl CsvReadOptions {
    /// Render as Spark CSV reader options, in a stable order
    pub fn engine_options(&self) -> Vec<(&'static str, String)> {
        vec![
            ("header", self.header.to_string()),
            ("sep", char::from(self.delimiter).to_string()),
            ("quote", char::from(self.quote).to_string()),
            ("escape", char::from(self.escape).to_string()),
            ("multiLine", self.multi_line.to_string()),
            ("mode", self.mode.as_engine_value().to_string()),
        ]
    }

    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        // Headers are handled by the reader so that naming rules apply
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote);

        if self.escape == self.quote {
            builder.double_quote(true).escape(None);
        } else {
            builder.double_quote(false).escape(Some(self.escape));
        }

        builder
    }
}
