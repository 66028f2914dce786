//! Deduplication by `order_id`

use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cleaning::coerce::CoercedRow;
use crate::config::DedupPolicy;

/// Keep one row per `order_id`
///
/// The survivors stay in input order. Returns the survivors and the number
/// of rows removed.
#[must_use]
pub fn deduplicate(rows: Vec<CoercedRow>, policy: DedupPolicy) -> (Vec<CoercedRow>, usize) {
    let mut winners: FxHashMap<&str, usize> = FxHashMap::default();

    for (idx, row) in rows.iter().enumerate() {
        match winners.entry(row.order_id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(idx);
            }
            Entry::Occupied(mut slot) => {
                // Strictly later dates only, so equal dates keep the first occurrence
                if policy == DedupPolicy::LatestOrderDate
                    && row.order_date > rows[*slot.get()].order_date
                {
                    slot.insert(idx);
                }
            }
        }
    }

    let keep: FxHashSet<usize> = winners.into_values().collect();
    let removed = rows.len() - keep.len();
    let survivors = rows
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, row)| row)
        .collect();

    (survivors, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(line: u64, id: &str, date: (i32, u32, u32)) -> CoercedRow {
        CoercedRow {
            line,
            order_id: id.to_string(),
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            delivery_time: Some(100.0),
            agent_rating: Some(4.5),
            area: Some("Urban".to_string()),
            weather: Some("Sunny".to_string()),
            category: Some("Grocery".to_string()),
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

    fn lines(rows: &[CoercedRow]) -> Vec<u64> {
        rows.iter().map(|r| r.line).collect()
    }

    #[test]
    fn test_keep_first() {
        let rows = vec![
            row(2, "101", (2022, 1, 1)),
            row(3, "102", (2022, 1, 2)),
            row(4, "101", (2022, 1, 5)),
        ];
        let (kept, removed) = deduplicate(rows, DedupPolicy::KeepFirst);
        assert_eq!(removed, 1);
        assert_eq!(lines(&kept), vec![2, 3]);
    }

    #[test]
    fn test_latest_order_date() {
        let rows = vec![
            row(2, "101", (2022, 1, 1)),
            row(3, "102", (2022, 1, 2)),
            row(4, "101", (2022, 1, 5)),
            row(5, "101", (2022, 1, 3)),
        ];
        let (kept, removed) = deduplicate(rows, DedupPolicy::LatestOrderDate);
        assert_eq!(removed, 2);
        assert_eq!(lines(&kept), vec![3, 4]);
    }

    #[test]
    fn test_latest_order_date_tie_keeps_first() {
        let rows = vec![row(2, "7", (2022, 2, 1)), row(3, "7", (2022, 2, 1))];
        let (kept, _) = deduplicate(rows, DedupPolicy::LatestOrderDate);
        assert_eq!(lines(&kept), vec![2]);
    }
}
