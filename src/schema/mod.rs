//! Column layout of the raw extract and date handling for its fields.

pub mod columns;
pub mod dates;

pub use columns::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS, check_header};
pub use dates::{DateFormatConfig, detect_date_format, parse_date_string};

/// Result of comparing an extract header against the expected columns
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HeaderReport {
    /// Required columns absent from the header
    pub missing_required: Vec<String>,
    /// Optional passthrough columns absent from the header
    pub missing_optional: Vec<String>,
    /// Header columns the cleaner does not use
    pub ignored: Vec<String>,
}

impl HeaderReport {
    /// Whether every required column is present
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.missing_required.is_empty()
    }
}
