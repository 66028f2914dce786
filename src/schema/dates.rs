//! Date parsing for the `Order_Date` column and weekday derivation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Configuration for date format handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// Date-only formats tried in order
    pub date_formats: Vec<String>,
    /// Date-time formats tried after the date-only ones; the time part is dropped
    pub datetime_formats: Vec<String>,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2022-03-19
                "%d-%m-%Y".to_string(), // European: 19-03-2022
                "%m/%d/%Y".to_string(), // US: 03/19/2022
                "%d/%m/%Y".to_string(), // UK: 19/03/2022
                "%d.%m.%Y".to_string(), // 19.03.2022
                "%Y%m%d".to_string(),   // Compact: 20220319
                "%d %b %Y".to_string(), // 19 Mar 2022
                "%d %B %Y".to_string(), // 19 March 2022
            ],
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
            ],
            enable_format_detection: true,
        }
    }
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in &config.datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }

    if config.enable_format_detection {
        if let Some(detected_format) = detect_date_format(s) {
            if let Ok(date) = NaiveDate::parse_from_str(s, detected_format) {
                return Some(date);
            }
        }
    }

    None
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    // YYYY-MM-DD, possibly with single-digit month or day
    let dashed: Vec<&str> = s.split('-').collect();
    if dashed.len() == 3 && dashed[0].len() == 4 {
        return Some("%Y-%m-%d");
    }

    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 3 {
            if parts[0].len() == 4 {
                return Some("%Y/%m/%d");
            } else if parts[2].len() == 4 {
                if let Ok(first_num) = parts[0].parse::<u8>() {
                    if first_num > 12 {
                        return Some("%d/%m/%Y");
                    }
                    return Some("%m/%d/%Y");
                }
            }
        }
    }

    if s.contains('.') {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts[2].len() == 4 {
            return Some("%d.%m.%Y");
        }
    }

    None
}

/// Monday = 1 through Sunday = 7
#[must_use]
pub fn day_of_week(date: NaiveDate) -> u8 {
    // number_from_monday is 1..=7 so the cast cannot truncate
    date.weekday().number_from_monday() as u8
}

/// English weekday name, e.g. "Monday"
#[must_use]
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_common_formats() {
        let config = DateFormatConfig::default();
        assert_eq!(parse_date_string("2022-03-19", &config), Some(ymd(2022, 3, 19)));
        assert_eq!(parse_date_string("19.03.2022", &config), Some(ymd(2022, 3, 19)));
        assert_eq!(parse_date_string("20220319", &config), Some(ymd(2022, 3, 19)));
        assert_eq!(parse_date_string(" 2022-03-19 ", &config), Some(ymd(2022, 3, 19)));
    }

    #[test]
    fn test_parse_datetime_drops_time() {
        let config = DateFormatConfig::default();
        assert_eq!(
            parse_date_string("2022-03-19 11:30:00", &config),
            Some(ymd(2022, 3, 19))
        );
        assert_eq!(
            parse_date_string("2022-03-19T23:59:59", &config),
            Some(ymd(2022, 3, 19))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let config = DateFormatConfig::default();
        assert_eq!(parse_date_string("", &config), None);
        assert_eq!(parse_date_string("yesterday", &config), None);
        assert_eq!(parse_date_string("2022-13-40", &config), None);
    }

    #[test]
    fn test_detection_without_configured_formats() {
        let config = DateFormatConfig {
            date_formats: Vec::new(),
            datetime_formats: Vec::new(),
            enable_format_detection: true,
        };
        assert_eq!(parse_date_string("2022-3-9", &config), Some(ymd(2022, 3, 9)));
        assert_eq!(parse_date_string("25/12/2021", &config), Some(ymd(2021, 12, 25)));
        assert_eq!(parse_date_string("2021/12/25", &config), Some(ymd(2021, 12, 25)));
    }

    #[test]
    fn test_day_of_week_monday_first() {
        // 2022-01-03 was a Monday
        assert_eq!(day_of_week(ymd(2022, 1, 3)), 1);
        assert_eq!(day_name(ymd(2022, 1, 3)), "Monday");
        assert_eq!(day_of_week(ymd(2022, 1, 1)), 6);
        assert_eq!(day_name(ymd(2022, 1, 1)), "Saturday");
        assert_eq!(day_of_week(ymd(2022, 1, 2)), 7);
        assert_eq!(day_name(ymd(2022, 1, 2)), "Sunday");
    }
}
