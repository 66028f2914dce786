//! Median imputation of missing numeric values

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::cleaning::coerce::CoercedRow;
use crate::config::ImputationKey;

/// Median of `values`; the mean of the two middle values for even lengths
///
/// Sorts `values` in place.
#[must_use]
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Group a row belongs to for imputation
///
/// Rows with a missing grouping label fall in the `unknown` group, the same
/// label they will carry in the cleaned table.
#[must_use]
pub fn group_of<'a>(row: &'a CoercedRow, key: ImputationKey, unknown: &'a str) -> &'a str {
    match key {
        ImputationKey::Category => row.category.as_deref().unwrap_or(unknown),
        ImputationKey::Area => row.area.as_deref().unwrap_or(unknown),
        ImputationKey::Global => "",
    }
}

/// Per-group medians of one field with a global fallback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMedians {
    by_group: FxHashMap<String, f64>,
    global: Option<f64>,
}

impl GroupMedians {
    /// Compute medians of `value` over the known values in `rows`
    pub fn compute<F>(rows: &[CoercedRow], key: ImputationKey, unknown: &str, value: F) -> Self
    where
        F: Fn(&CoercedRow) -> Option<f64>,
    {
        let mut all: Vec<f64> = rows.iter().filter_map(&value).collect();
        let global = median(&mut all);

        let by_group = rows
            .iter()
            .filter_map(|row| value(row).map(|v| (group_of(row, key, unknown), v)))
            .into_group_map()
            .into_iter()
            .filter_map(|(group, mut values)| median(&mut values).map(|m| (group.to_string(), m)))
            .collect();

        Self { by_group, global }
    }

    /// Median for `group`, or the global median when the group has no known values
    #[must_use]
    pub fn lookup(&self, group: &str) -> Option<f64> {
        self.by_group.get(group).copied().or(self.global)
    }

    #[must_use]
    pub fn global(&self) -> Option<f64> {
        self.global
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(category: Option<&str>, area: &str, time: Option<f64>) -> CoercedRow {
        CoercedRow {
            line: 2,
            order_id: "x".to_string(),
            order_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            delivery_time: time,
            agent_rating: Some(4.0),
            area: Some(area.to_string()),
            weather: Some("Sunny".to_string()),
            category: category.map(str::to_string),
            agent_age: None,
            store_latitude: None,
            store_longitude: None,
            drop_latitude: None,
            drop_longitude: None,
            order_time: None,
            pickup_time: None,
            traffic: None,
            vehicle: None,
        }
    }

    #[test]
    fn test_median_odd_even_empty() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_group_medians_with_fallback() {
        let rows = vec![
            row(Some("Grocery"), "Urban", Some(100.0)),
            row(Some("Grocery"), "Urban", Some(120.0)),
            row(Some("Grocery"), "Metropolitian", Some(140.0)),
            row(Some("Sports"), "Urban", Some(10.0)),
            row(Some("Toys"), "Urban", None),
        ];
        let medians =
            GroupMedians::compute(&rows, ImputationKey::Category, "Unknown", |r| r.delivery_time);

        assert_eq!(medians.lookup("Grocery"), Some(120.0));
        assert_eq!(medians.lookup("Sports"), Some(10.0));
        // No known Toys values: global median of 10, 100, 120, 140
        assert_eq!(medians.lookup("Toys"), Some(110.0));
        assert_eq!(medians.global(), Some(110.0));
    }

    #[test]
    fn test_area_grouping_and_unknown_label() {
        let rows = vec![
            row(None, "Urban", Some(50.0)),
            row(None, "Semi-Urban", Some(200.0)),
        ];
        let by_area = GroupMedians::compute(&rows, ImputationKey::Area, "Unknown", |r| r.delivery_time);
        assert_eq!(by_area.lookup("Semi-Urban"), Some(200.0));

        let by_category =
            GroupMedians::compute(&rows, ImputationKey::Category, "Unknown", |r| r.delivery_time);
        assert_eq!(by_category.lookup("Unknown"), Some(125.0));
    }

    #[test]
    fn test_no_known_values() {
        let rows = vec![row(Some("Grocery"), "Urban", None)];
        let medians =
            GroupMedians::compute(&rows, ImputationKey::Global, "Unknown", |r| r.delivery_time);
        assert_eq!(medians.lookup(""), None);
    }
}
