//! Typed result rows of the analysis queries

use serde::Serialize;

use crate::utils::logging::console::format_optional;

/// Headline figures for the whole table
///
/// Averages are `None` when the table is empty or has not been loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Distinct order ids
    pub total_deliveries: u64,
    /// Distinct order dates
    pub active_days: u64,
    pub avg_delivery_time_min: Option<f64>,
    pub avg_agent_rating: Option<f64>,
    /// Distinct areas
    pub areas_covered: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOfWeekRow {
    pub order_day_name: String,
    pub order_day_of_week: u8,
    pub deliveries: u64,
    pub avg_delivery_time_min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    pub area: String,
    pub deliveries: u64,
    pub avg_delivery_time_min: Option<f64>,
    pub avg_agent_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRow {
    pub weather: String,
    pub deliveries: u64,
    pub avg_delivery_time_min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub order_count: u64,
    pub avg_delivery_time_min: Option<f64>,
}

/// Rows that can be printed as a console table
pub trait TabularRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TabularRow for KpiSummary {
    const HEADERS: &'static [&'static str] = &[
        "total_deliveries",
        "active_days",
        "avg_delivery_time_min",
        "avg_agent_rating",
        "areas_covered",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.total_deliveries.to_string(),
            self.active_days.to_string(),
            format_optional(self.avg_delivery_time_min),
            format_optional(self.avg_agent_rating),
            self.areas_covered.to_string(),
        ]
    }
}

impl TabularRow for DayOfWeekRow {
    const HEADERS: &'static [&'static str] = &[
        "order_day_name",
        "order_day_of_week",
        "deliveries",
        "avg_delivery_time_min",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.order_day_name.clone(),
            self.order_day_of_week.to_string(),
            self.deliveries.to_string(),
            format_optional(self.avg_delivery_time_min),
        ]
    }
}

impl TabularRow for AreaRow {
    const HEADERS: &'static [&'static str] = &[
        "area",
        "deliveries",
        "avg_delivery_time_min",
        "avg_agent_rating",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.area.clone(),
            self.deliveries.to_string(),
            format_optional(self.avg_delivery_time_min),
            format_optional(self.avg_agent_rating),
        ]
    }
}

impl TabularRow for WeatherRow {
    const HEADERS: &'static [&'static str] = &["weather", "deliveries", "avg_delivery_time_min"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.weather.clone(),
            self.deliveries.to_string(),
            format_optional(self.avg_delivery_time_min),
        ]
    }
}

impl TabularRow for CategoryRow {
    const HEADERS: &'static [&'static str] = &["category", "order_count", "avg_delivery_time_min"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.order_count.to_string(),
            format_optional(self.avg_delivery_time_min),
        ]
    }
}
