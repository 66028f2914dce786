//! Read-only aggregate queries over the cleaned deliveries table
//!
//! Each query only ever sees the last committed load. Before the first load
//! they return empty results instead of failing.

pub mod queries;
pub mod results;

use std::fmt;

use serde::Serialize;

use crate::error::PersistenceError;
use crate::store::SqliteStore;
use crate::utils::logging::console::render_table;

pub use queries::{by_area, by_day_of_week, kpi_summary, top_categories, weather_impact};
pub use results::{AreaRow, CategoryRow, DayOfWeekRow, KpiSummary, TabularRow, WeatherRow};

/// One of the five analysis queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Totals, active days and overall averages
    Kpi,
    /// Deliveries per weekday
    ByDay,
    /// Deliveries per area
    ByArea,
    /// Deliveries per weather condition
    Weather,
    /// Ten most ordered categories
    TopCategories,
}

impl Query {
    pub const ALL: [Self; 5] = [
        Self::Kpi,
        Self::ByDay,
        Self::ByArea,
        Self::Weather,
        Self::TopCategories,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Kpi => "KPI Summary",
            Self::ByDay => "Deliveries by Day of Week",
            Self::ByArea => "Deliveries by Area",
            Self::Weather => "Weather Impact",
            Self::TopCategories => "Top Categories",
        }
    }

    /// Statement template, with `{table}` still unresolved
    #[must_use]
    pub fn sql_template(self) -> &'static str {
        match self {
            Self::Kpi => queries::KPI_SUMMARY_SQL,
            Self::ByDay => queries::BY_DAY_OF_WEEK_SQL,
            Self::ByArea => queries::BY_AREA_SQL,
            Self::Weather => queries::WEATHER_IMPACT_SQL,
            Self::TopCategories => queries::TOP_CATEGORIES_SQL,
        }
    }

    /// Run this query against `store`
    pub fn run(self, store: &SqliteStore) -> Result<QueryOutput, PersistenceError> {
        log::debug!("Running query '{}' on table {}", self.title(), store.table());
        Ok(match self {
            Self::Kpi => QueryOutput::Kpi(kpi_summary(store)?),
            Self::ByDay => QueryOutput::ByDay(by_day_of_week(store)?),
            Self::ByArea => QueryOutput::ByArea(by_area(store)?),
            Self::Weather => QueryOutput::Weather(weather_impact(store)?),
            Self::TopCategories => QueryOutput::TopCategories(top_categories(store)?),
        })
    }
}

/// Result of a single query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Kpi(KpiSummary),
    ByDay(Vec<DayOfWeekRow>),
    ByArea(Vec<AreaRow>),
    Weather(Vec<WeatherRow>),
    TopCategories(Vec<CategoryRow>),
}

impl QueryOutput {
    /// Number of result rows; the KPI summary is always one row
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Kpi(_) => 1,
            Self::ByDay(rows) => rows.len(),
            Self::ByArea(rows) => rows.len(),
            Self::Weather(rows) => rows.len(),
            Self::TopCategories(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn table<T: TabularRow>(rows: &[T]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(T::cells).collect();
    render_table(T::HEADERS, &cells)
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Kpi(kpi) => table(std::slice::from_ref(kpi)),
            Self::ByDay(rows) => table(rows),
            Self::ByArea(rows) => table(rows),
            Self::Weather(rows) => table(rows),
            Self::TopCategories(rows) => table(rows),
        };
        f.write_str(&text)
    }
}

/// All five query results, as consumed by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub kpi_summary: KpiSummary,
    pub by_day_of_week: Vec<DayOfWeekRow>,
    pub by_area: Vec<AreaRow>,
    pub weather_impact: Vec<WeatherRow>,
    pub top_categories: Vec<CategoryRow>,
}

impl AnalysisReport {
    /// Run every query in order
    pub fn run_all(store: &SqliteStore) -> Result<Self, PersistenceError> {
        Ok(Self {
            kpi_summary: kpi_summary(store)?,
            by_day_of_week: by_day_of_week(store)?,
            by_area: by_area(store)?,
            weather_impact: weather_impact(store)?,
            top_categories: top_categories(store)?,
        })
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            (Query::Kpi, table(std::slice::from_ref(&self.kpi_summary))),
            (Query::ByDay, table(&self.by_day_of_week)),
            (Query::ByArea, table(&self.by_area)),
            (Query::Weather, table(&self.weather_impact)),
            (Query::TopCategories, table(&self.top_categories)),
        ];
        for (idx, (query, body)) in sections.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "== {} ==", query.title())?;
            writeln!(f, "{body}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CleanedTable, DeliveryRecord};
    use chrono::NaiveDate;

    fn store_with(records: Vec<DeliveryRecord>) -> SqliteStore {
        let mut store = SqliteStore::open_in_memory("deliveries").unwrap();
        store.replace_all(&CleanedTable::new(records)).unwrap();
        store
    }

    fn record(id: &str, day: u32, area: &str) -> DeliveryRecord {
        DeliveryRecord::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2022, 3, day).unwrap(),
            100.0,
            4.0,
            area.to_string(),
            "Sunny".to_string(),
            "Grocery".to_string(),
        )
    }

    #[test]
    fn test_query_run_matches_run_all() {
        let store = store_with(vec![record("1", 14, "Urban"), record("2", 20, "Semi-Urban")]);
        let report = AnalysisReport::run_all(&store).unwrap();

        assert_eq!(Query::Kpi.run(&store).unwrap(), QueryOutput::Kpi(report.kpi_summary.clone()));
        assert_eq!(
            Query::ByArea.run(&store).unwrap(),
            QueryOutput::ByArea(report.by_area.clone())
        );
        assert_eq!(Query::ByDay.run(&store).unwrap().len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let store = store_with(vec![record("1", 14, "Urban")]);
        let report = AnalysisReport::run_all(&store).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["kpi_summary"]["total_deliveries"], 1);
        assert_eq!(json["kpi_summary"]["avg_delivery_time_min"], 100.0);
        assert_eq!(json["by_day_of_week"][0]["order_day_name"], "Monday");
        assert_eq!(json["top_categories"][0]["order_count"], 1);

        let single = serde_json::to_value(Query::Weather.run(&store).unwrap()).unwrap();
        assert!(single.is_array());
    }

    #[test]
    fn test_text_rendering() {
        let store = SqliteStore::open_in_memory("deliveries").unwrap();
        let text = AnalysisReport::run_all(&store).unwrap().to_string();
        assert!(text.contains("== KPI Summary =="));
        assert!(text.contains("== Top Categories =="));
        assert!(text.contains("NULL"));
    }
}
