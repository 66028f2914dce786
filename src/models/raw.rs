//! Untyped rows of the raw extract

use serde::Deserialize;

use crate::error::RowValidationError;

/// Tokens that mean "no value" in the extract, compared case-insensitively
const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

/// Whether a raw cell should be treated as missing
#[must_use]
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// One row of the delivery extract as read from disk
///
/// Field names match the lowercased header; the loader normalises the header
/// before deserializing so `Order_ID` and `order_id` both land here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawDeliveryRecord {
    pub order_id: Option<String>,
    pub agent_age: Option<String>,
    pub agent_rating: Option<String>,
    pub store_latitude: Option<String>,
    pub store_longitude: Option<String>,
    pub drop_latitude: Option<String>,
    pub drop_longitude: Option<String>,
    pub order_date: Option<String>,
    pub order_time: Option<String>,
    pub pickup_time: Option<String>,
    pub weather: Option<String>,
    pub traffic: Option<String>,
    pub vehicle: Option<String>,
    pub area: Option<String>,
    pub delivery_time: Option<String>,
    pub category: Option<String>,
}

/// Trimmed cell value, or `None` for missing-value tokens
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !is_missing_token(v))
}

impl RawDeliveryRecord {
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        present(self.order_id.as_ref())
    }

    #[must_use]
    pub fn order_date(&self) -> Option<&str> {
        present(self.order_date.as_ref())
    }

    #[must_use]
    pub fn delivery_time(&self) -> Option<&str> {
        present(self.delivery_time.as_ref())
    }

    #[must_use]
    pub fn agent_rating(&self) -> Option<&str> {
        present(self.agent_rating.as_ref())
    }

    #[must_use]
    pub fn area(&self) -> Option<&str> {
        present(self.area.as_ref())
    }

    #[must_use]
    pub fn weather(&self) -> Option<&str> {
        present(self.weather.as_ref())
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        present(self.category.as_ref())
    }

    /// Any of the passthrough columns, by lowercase name
    #[must_use]
    pub fn passthrough(&self, column: &str) -> Option<&str> {
        let value = match column {
            "agent_age" => &self.agent_age,
            "store_latitude" => &self.store_latitude,
            "store_longitude" => &self.store_longitude,
            "drop_latitude" => &self.drop_latitude,
            "drop_longitude" => &self.drop_longitude,
            "order_time" => &self.order_time,
            "pickup_time" => &self.pickup_time,
            "traffic" => &self.traffic,
            "vehicle" => &self.vehicle,
            _ => return None,
        };
        present(value.as_ref())
    }
}

/// A raw row together with the line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number; the header is line 1
    pub line: u64,
    pub record: RawDeliveryRecord,
}

/// Everything read from the extract, before any cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Rows the CSV reader decoded, in input order
    pub rows: Vec<RawRow>,
    /// Lines the CSV reader could not decode
    pub malformed: Vec<RowValidationError>,
    /// Header columns the cleaner does not use
    pub ignored_columns: Vec<String>,
}

impl RawTable {
    /// Build a table from records, numbering lines as if read from a file
    #[must_use]
    pub fn from_records(records: Vec<RawDeliveryRecord>) -> Self {
        let rows = records
            .into_iter()
            .zip(2u64..)
            .map(|(record, line)| RawRow { line, record })
            .collect();
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Every data line, decoded or not
    #[must_use]
    pub fn input_rows(&self) -> usize {
        self.rows.len() + self.malformed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_rows() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  "));
        assert!(is_missing_token("NaN"));
        assert!(is_missing_token("NA"));
        assert!(is_missing_token("null"));
        assert!(is_missing_token("None "));
        assert!(!is_missing_token("0"));
        assert!(!is_missing_token("Nantes"));
    }

    #[test]
    fn test_accessors_trim_and_filter() {
        let record = RawDeliveryRecord {
            order_id: Some(" ialx566343618 ".to_string()),
            weather: Some("NaN".to_string()),
            traffic: Some("High ".to_string()),
            ..RawDeliveryRecord::default()
        };
        assert_eq!(record.order_id(), Some("ialx566343618"));
        assert_eq!(record.weather(), None);
        assert_eq!(record.area(), None);
        assert_eq!(record.passthrough("traffic"), Some("High"));
        assert_eq!(record.passthrough("unknown"), None);
    }

    #[test]
    fn test_from_records_numbers_lines_after_header() {
        let table = RawTable::from_records(vec![
            RawDeliveryRecord::default(),
            RawDeliveryRecord::default(),
        ]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
        assert_eq!(table.input_rows(), 2);
    }
}
