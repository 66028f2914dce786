//! Cleaned delivery entity model

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::schema::dates::{day_name, day_of_week};

/// One cleaned delivery event
///
/// Construct through [`DeliveryRecord::new`] so the day fields always agree
/// with `order_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub order_year: i32,
    pub order_month: u32,
    /// Monday = 1 through Sunday = 7
    pub order_day_of_week: u8,
    pub order_day_name: String,
    /// Minutes, never negative
    pub delivery_time: f64,
    pub agent_rating: f64,
    pub area: String,
    pub weather: String,
    pub category: String,
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

impl DeliveryRecord {
    /// Create a record, deriving the calendar fields from `order_date`
    ///
    /// Passthrough attributes start empty; set them on the returned value.
    #[must_use]
    pub fn new(
        order_id: String,
        order_date: NaiveDate,
        delivery_time: f64,
        agent_rating: f64,
        area: String,
        weather: String,
        category: String,
    ) -> Self {
        Self {
            order_id,
            order_date,
            order_year: order_date.year(),
            order_month: order_date.month(),
            order_day_of_week: day_of_week(order_date),
            order_day_name: day_name(order_date).to_string(),
            delivery_time,
            agent_rating,
            area,
            weather,
            category,
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

    /// Whether the derived calendar fields match `order_date`
    #[must_use]
    pub fn calendar_consistent(&self) -> bool {
        self.order_year == self.order_date.year()
            && self.order_month == self.order_date.month()
            && self.order_day_of_week == day_of_week(self.order_date)
            && self.order_day_name == day_name(self.order_date)
    }
}

/// The cleaner's output, in input order of the surviving rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTable {
    pub records: Vec<DeliveryRecord>,
}

impl CleanedTable {
    #[must_use]
    pub fn new(records: Vec<DeliveryRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeliveryRecord> {
        self.records.iter()
    }

    /// Number of distinct `order_id`s
    #[must_use]
    pub fn distinct_order_ids(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }
}
