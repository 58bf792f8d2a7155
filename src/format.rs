//! Tabular rendering of Neptune data.
//!
//! Leaderboards, property maps and channel values render as CSV or JSON.

use csv::Writer;
use serde::Serialize;

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
    #[error("CSV writer into inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputFormatOptions {
    pub with_headers: bool,
    pub pretty: bool,
}

/// Enum representing the supported output formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Csv(OutputFormatOptions),
    Json(OutputFormatOptions),
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json(OutputFormatOptions::default())
    }
}

/// Trait for producing CSV records from data
pub trait CsvRecordProducer {
    /// Returns the header row for the CSV output
    fn csv_header(&self) -> Vec<String>;

    /// Converts the data into CSV records
    fn as_csv_records(&self) -> Vec<Vec<String>>;

    /// Produces CSV output with or without a header row
    fn to_csv(&self, with_header: bool) -> Result<String, FormattingError> {
        let mut wtr = Writer::from_writer(Vec::new());
        if with_header {
            wtr.write_record(self.csv_header())?;
        }
        for record in self.as_csv_records() {
            wtr.write_record(&record)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        let bytes = wtr.into_inner()?;
        Ok(String::from_utf8(bytes)?)
    }
}

pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

/// Anything serializable that also knows its CSV shape renders in every format
impl<T> Formattable for T
where
    T: CsvRecordProducer + Serialize,
{
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => {
                if options.pretty {
                    Ok(serde_json::to_string_pretty(self)?)
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

/// Render an optional value as a CSV cell, empty when absent
pub fn optional_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
