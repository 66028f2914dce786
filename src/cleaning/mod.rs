//! The cleaner: raw rows in, typed records and a validation report out
//!
//! [`clean`] is pure. It reads nothing from disk, writes nothing, and given
//! the same [`RawTable`] and [`CleaningConfig`] it produces the same
//! [`CleanedTable`] every time. The steps run in a fixed order:
//!
//! 1. coercion ([`coerce`]): rows without an id or a parseable date are rejected
//! 2. deduplication by `order_id` ([`dedup`])
//! 3. median imputation of `delivery_time` and `agent_rating` ([`impute`]),
//!    and the unknown label for missing categorical values
//! 4. calendar fields derived from `order_date`

pub mod coerce;
pub mod dedup;
pub mod impute;

use log::debug;

use crate::config::CleaningConfig;
use crate::error::RowValidationError;
use crate::models::{CleanedTable, DeliveryRecord, RawTable};
use crate::report::ValidationReport;

use coerce::{CoercedRow, coerce_row};
use dedup::deduplicate;
use impute::{GroupMedians, group_of};

/// Columns of `DeliveryRecord`, the denominator of the output missing percentage
const TOTAL_FIELDS: usize = 20;

/// Clean a raw table
#[must_use]
pub fn clean(raw: &RawTable, config: &CleaningConfig) -> (CleanedTable, ValidationReport) {
    let mut report = ValidationReport {
        input_rows: raw.input_rows(),
        imputation_key: config.imputation_key,
        dedup_policy: config.dedup_policy,
        ignored_columns: raw.ignored_columns.clone(),
        ..ValidationReport::default()
    };
    for malformed in &raw.malformed {
        report.reject(malformed.clone());
    }

    let mut coerced = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        match coerce_row(row, config, &mut report) {
            Ok(row) => coerced.push(row),
            Err(rejection) => report.reject(rejection),
        }
    }
    debug!(
        "Coerced {} of {} decoded rows",
        coerced.len(),
        raw.rows.len()
    );

    let (deduplicated, removed) = deduplicate(coerced, config.dedup_policy);
    report.duplicates_removed = removed;
    debug!("Removed {removed} duplicate order ids");

    let records = impute_and_build(deduplicated, config, &mut report);
    let table = CleanedTable::new(records);

    finish_report(&table, &mut report);
    (table, report)
}

/// Fill nulls and build the typed records
fn impute_and_build(
    rows: Vec<CoercedRow>,
    config: &CleaningConfig,
    report: &mut ValidationReport,
) -> Vec<DeliveryRecord> {
    let unknown = config.unknown_label.as_str();
    let key = config.imputation_key;

    let time_medians = GroupMedians::compute(&rows, key, unknown, |r| r.delivery_time);
    let rating_medians = GroupMedians::compute(&rows, key, unknown, |r| r.agent_rating);

    for (field, nulls) in [
        ("delivery_time", rows.iter().filter(|r| r.delivery_time.is_none()).count()),
        ("agent_rating", rows.iter().filter(|r| r.agent_rating.is_none()).count()),
        ("area", rows.iter().filter(|r| r.area.is_none()).count()),
        ("weather", rows.iter().filter(|r| r.weather.is_none()).count()),
        ("category", rows.iter().filter(|r| r.category.is_none()).count()),
    ] {
        report.field_mut(field).nulls_before_imputation = nulls;
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let group = group_of(&row, key, unknown);
        let delivery_time = row.delivery_time.or_else(|| time_medians.lookup(group));
        let agent_rating = row.agent_rating.or_else(|| rating_medians.lookup(group));

        let (Some(delivery_time), Some(agent_rating)) = (delivery_time, agent_rating) else {
            let field = if delivery_time.is_none() {
                "delivery_time"
            } else {
                "agent_rating"
            };
            report.reject(RowValidationError::Unimputable {
                line: row.line,
                order_id: row.order_id,
                field,
            });
            continue;
        };

        if row.delivery_time.is_none() {
            report.field_mut("delivery_time").imputed += 1;
        }
        if row.agent_rating.is_none() {
            report.field_mut("agent_rating").imputed += 1;
        }

        let mut fill = |field: &str, value: Option<String>| {
            value.unwrap_or_else(|| {
                report.field_mut(field).imputed += 1;
                unknown.to_string()
            })
        };
        let area = fill("area", row.area);
        let weather = fill("weather", row.weather);
        let category = fill("category", row.category);

        let mut record = DeliveryRecord::new(
            row.order_id,
            row.order_date,
            delivery_time,
            agent_rating,
            area,
            weather,
            category,
        );
        record.agent_age = row.agent_age;
        record.store_latitude = row.store_latitude;
        record.store_longitude = row.store_longitude;
        record.drop_latitude = row.drop_latitude;
        record.drop_longitude = row.drop_longitude;
        record.order_time = row.order_time;
        record.pickup_time = row.pickup_time;
        record.traffic = row.traffic;
        record.vehicle = row.vehicle;
        records.push(record);
    }

    records
}

/// Output-side figures: row count, null counts after cleaning, uniqueness
fn finish_report(table: &CleanedTable, report: &mut ValidationReport) {
    report.output_rows = table.len();
    report.rejections.sort_by_key(RowValidationError::line);

    // Required fields cannot be null in a DeliveryRecord
    for stats in report.fields.values_mut() {
        stats.nulls_after = 0;
    }

    let optional_nulls: usize = table
        .iter()
        .map(|r| {
            [
                r.agent_age.is_none(),
                r.store_latitude.is_none(),
                r.store_longitude.is_none(),
                r.drop_latitude.is_none(),
                r.drop_longitude.is_none(),
                r.order_time.is_none(),
                r.pickup_time.is_none(),
                r.traffic.is_none(),
                r.vehicle.is_none(),
            ]
            .into_iter()
            .filter(|missing| *missing)
            .count()
        })
        .sum();

    if table.is_empty() {
        report.order_id_unique_ratio = 0.0;
        report.output_missing_pct = 0.0;
    } else {
        report.order_id_unique_ratio = table.distinct_order_ids() as f64 / table.len() as f64;
        report.output_missing_pct =
            optional_nulls as f64 / (table.len() * TOTAL_FIELDS) as f64 * 100.0;
    }
}
