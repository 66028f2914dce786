//! Type coercion of raw rows

use chrono::NaiveDate;

use crate::config::CleaningConfig;
use crate::error::RowValidationError;
use crate::models::RawRow;
use crate::report::ValidationReport;
use crate::schema::parse_date_string;

/// A row whose identity fields are valid; numeric fields may still be null
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRow {
    pub line: u64,
    pub order_id: String,
    pub order_date: NaiveDate,
    pub delivery_time: Option<f64>,
    pub agent_rating: Option<f64>,
    pub area: Option<String>,
    pub weather: Option<String>,
    pub category: Option<String>,
    pub agent_age: Option<i64>,
    pub store_latitude: Option<f64>,
    pub store_longitude: Option<f64>,
    pub drop_latitude: Option<f64>,
    pub drop_longitude: Option<f64>,
    pub order_time: Option<String>,
    pub pickup_time: Option<String>,
    pub traffic: Option<String>,
    pub vehicle: Option<String>,
}

/// Result of parsing one numeric cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    Missing,
    Unparseable,
    OutOfRange,
    Valid(f64),
}

impl NumericCell {
    /// Parse `raw`, accepting only finite values for which `valid` holds
    pub fn parse<F>(raw: Option<&str>, valid: F) -> Self
    where
        F: Fn(f64) -> bool,
    {
        let Some(raw) = raw else {
            return Self::Missing;
        };
        match raw.parse::<f64>() {
            Ok(value) if !value.is_finite() => Self::Unparseable,
            Ok(value) if valid(value) => Self::Valid(value),
            Ok(_) => Self::OutOfRange,
            Err(_) => Self::Unparseable,
        }
    }

    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Valid(value) => Some(value),
            _ => None,
        }
    }
}

/// Count a numeric cell outcome against `field` and return its value
fn tally(report: &mut ValidationReport, field: &str, cell: NumericCell) -> Option<f64> {
    let stats = report.field_mut(field);
    match cell {
        NumericCell::Missing => stats.missing_in_extract += 1,
        NumericCell::Unparseable => stats.unparseable += 1,
        NumericCell::OutOfRange => stats.out_of_range += 1,
        NumericCell::Valid(_) => {}
    }
    cell.value()
}

/// Categorical label, counting it against `field` when missing
fn label(report: &mut ValidationReport, field: &str, value: Option<&str>) -> Option<String> {
    if value.is_none() {
        report.field_mut(field).missing_in_extract += 1;
    }
    value.map(str::to_string)
}

fn optional_number(row: &RawRow, column: &str) -> Option<f64> {
    NumericCell::parse(row.record.passthrough(column), |_| true).value()
}

/// Agent ages are sometimes exported as floats ("23.0")
fn optional_integer(row: &RawRow, column: &str) -> Option<i64> {
    let value = optional_number(row, column)?;
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        // fract() == 0 and range checked, so the cast is exact
        Some(value as i64)
    } else {
        None
    }
}

fn optional_text(row: &RawRow, column: &str) -> Option<String> {
    row.record.passthrough(column).map(str::to_string)
}

/// Coerce one raw row
///
/// Rows without an `order_id` or a parseable `order_date` are rejected.
/// Every other problem is recorded in `report` and leaves a null for the
/// imputation step.
pub fn coerce_row(
    row: &RawRow,
    config: &CleaningConfig,
    report: &mut ValidationReport,
) -> Result<CoercedRow, RowValidationError> {
    let record = &row.record;

    let Some(order_id) = record.order_id() else {
        report.field_mut("order_id").missing_in_extract += 1;
        return Err(RowValidationError::MissingOrderId { line: row.line });
    };

    let raw_date = record.order_date();
    let order_date = match raw_date {
        Some(raw) => parse_date_string(raw, &config.date_format_config),
        None => None,
    };
    let Some(order_date) = order_date else {
        let stats = report.field_mut("order_date");
        if raw_date.is_some() {
            stats.unparseable += 1;
        } else {
            stats.missing_in_extract += 1;
        }
        return Err(RowValidationError::InvalidOrderDate {
            line: row.line,
            order_id: order_id.to_string(),
            value: raw_date.map(str::to_string),
        });
    };

    let delivery_time = tally(
        report,
        "delivery_time",
        NumericCell::parse(record.delivery_time(), |v| v >= 0.0),
    );
    let agent_rating = tally(
        report,
        "agent_rating",
        NumericCell::parse(record.agent_rating(), |v| config.rating_in_range(v)),
    );

    Ok(CoercedRow {
        line: row.line,
        order_id: order_id.to_string(),
        order_date,
        delivery_time,
        agent_rating,
        area: label(report, "area", record.area()),
        weather: label(report, "weather", record.weather()),
        category: label(report, "category", record.category()),
        agent_age: optional_integer(row, "agent_age"),
        store_latitude: optional_number(row, "store_latitude"),
        store_longitude: optional_number(row, "store_longitude"),
        drop_latitude: optional_number(row, "drop_latitude"),
        drop_longitude: optional_number(row, "drop_longitude"),
        order_time: optional_text(row, "order_time"),
        pickup_time: optional_text(row, "pickup_time"),
        traffic: optional_text(row, "traffic"),
        vehicle: optional_text(row, "vehicle"),
    })
}
