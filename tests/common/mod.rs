//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use delivery_analytics::{CleanedTable, DeliveryRecord, PipelineConfig, RawDeliveryRecord, SqliteStore};

/// Full header of the delivery extract
pub const HEADER: &str = "Order_ID,Agent_Age,Agent_Rating,Store_Latitude,Store_Longitude,\
Drop_Latitude,Drop_Longitude,Order_Date,Order_Time,Pickup_Time,Weather,Traffic,Vehicle,Area,\
Delivery_Time,Category";

/// A data line in the column order of [`HEADER`]
pub fn extract_line(
    id: &str,
    date: &str,
    delivery_time: &str,
    rating: &str,
    area: &str,
    weather: &str,
    category: &str,
) -> String {
    format!(
        "{id},30,{rating},22.745049,75.892471,22.765049,75.912471,{date},11:30:00,11:45:00,\
         {weather},High,motorcycle,{area},{delivery_time},{category}"
    )
}

/// Write `lines` below the header to `path`, creating parent directories
pub fn write_extract(path: &Path, lines: &[String]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut text = String::from(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    fs::write(path, text).unwrap();
}

/// Pipeline config rooted at `dir` with the sample extract already written
pub fn config_with_extract(dir: &Path, lines: &[String]) -> PipelineConfig {
    let config = PipelineConfig::with_data_dir(dir);
    write_extract(&config.raw_dataset, lines);
    config
}

/// Small extract with one duplicate, one missing id, one bad date and gaps
pub fn sample_lines() -> Vec<String> {
    vec![
        extract_line("a1", "2022-03-14", "120", "4.5", "Urban", "Sunny", "Grocery"),
        extract_line("a2", "2022-03-15", "NaN", "4.7", "Urban", "Cloudy", "Grocery"),
        extract_line("a3", "2022-03-16", "100", "4.1", "Metropolitian", "Sunny", "Grocery"),
        extract_line("a1", "2022-03-17", "999", "4.9", "Urban", "Sunny", "Grocery"),
        extract_line("", "2022-03-17", "80", "4.0", "Urban", "Sunny", "Toys"),
        extract_line("a5", "yesterday", "80", "4.0", "Urban", "Sunny", "Toys"),
        extract_line("a6", "19-03-2022", "150", "", "Semi-Urban", "Fog", "Electronics"),
        extract_line("a7", "2022-03-20", "140", "6.0", "Urban", "NaN", "Electronics"),
    ]
}

pub fn raw(id: &str, date: &str, delivery_time: &str, rating: &str, category: &str) -> RawDeliveryRecord {
    RawDeliveryRecord {
        order_id: Some(id.to_string()),
        order_date: Some(date.to_string()),
        delivery_time: Some(delivery_time.to_string()),
        agent_rating: Some(rating.to_string()),
        area: Some("Urban".to_string()),
        weather: Some("Sunny".to_string()),
        category: Some(category.to_string()),
        ..RawDeliveryRecord::default()
    }
}

pub fn record(
    id: impl Into<String>,
    date: NaiveDate,
    delivery_time: f64,
    area: &str,
    weather: &str,
    category: &str,
) -> DeliveryRecord {
    DeliveryRecord::new(
        id.into(),
        date,
        delivery_time,
        4.5,
        area.to_string(),
        weather.to_string(),
        category.to_string(),
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// In-memory store holding `records`
pub fn loaded_store(records: Vec<DeliveryRecord>) -> SqliteStore {
    let mut store = SqliteStore::open_in_memory("deliveries").unwrap();
    store.replace_all(&CleanedTable::new(records)).unwrap();
    store
}

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join("delivery_analytics.db")
}
