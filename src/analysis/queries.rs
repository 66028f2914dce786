//! The five aggregate statements and their row mappings
//!
//! Statements are templates over the table name; `{table}` is replaced with
//! the store's validated identifier before preparing. Averages are rounded by
//! SQLite's `ROUND(x, 2)`.

use rusqlite::{Connection, Row};

use crate::analysis::results::{AreaRow, CategoryRow, DayOfWeekRow, KpiSummary, WeatherRow};
use crate::error::PersistenceError;
use crate::store::SqliteStore;

type QueryResult<T> = std::result::Result<T, PersistenceError>;

/// Maximum rows returned by the top-categories query
pub const TOP_CATEGORIES_LIMIT: usize = 10;

pub const KPI_SUMMARY_SQL: &str = "
SELECT
    COUNT(DISTINCT order_id)       AS total_deliveries,
    COUNT(DISTINCT order_date)     AS active_days,
    ROUND(AVG(delivery_time), 2)   AS avg_delivery_time_min,
    ROUND(AVG(agent_rating), 2)    AS avg_agent_rating,
    COUNT(DISTINCT area)           AS areas_covered
FROM {table}";

pub const BY_DAY_OF_WEEK_SQL: &str = "
SELECT
    order_day_name,
    order_day_of_week,
    COUNT(*)                       AS deliveries,
    ROUND(AVG(delivery_time), 2)   AS avg_delivery_time_min
FROM {table}
GROUP BY order_day_name, order_day_of_week
ORDER BY order_day_of_week ASC";

pub const BY_AREA_SQL: &str = "
SELECT
    area,
    COUNT(*)                       AS deliveries,
    ROUND(AVG(delivery_time), 2)   AS avg_delivery_time_min,
    ROUND(AVG(agent_rating), 2)    AS avg_agent_rating
FROM {table}
GROUP BY area
ORDER BY deliveries DESC, area ASC";

pub const WEATHER_IMPACT_SQL: &str = "
SELECT
    weather,
    COUNT(*)                       AS deliveries,
    ROUND(AVG(delivery_time), 2)   AS avg_delivery_time_min
FROM {table}
GROUP BY weather
ORDER BY deliveries DESC, weather ASC";

pub const TOP_CATEGORIES_SQL: &str = "
SELECT
    category,
    COUNT(*)                       AS order_count,
    ROUND(AVG(delivery_time), 2)   AS avg_delivery_time_min
FROM {table}
GROUP BY category
ORDER BY order_count DESC, category ASC
LIMIT {limit}";

/// Substitute the table name (and the limit, where present) into a template
#[must_use]
pub fn render_sql(template: &str, table: &str) -> String {
    template
        .replace("{table}", table)
        .replace("{limit}", &TOP_CATEGORIES_LIMIT.to_string())
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    Ok(u64::try_from(value).unwrap_or_default())
}

fn fetch_all<T, F>(
    conn: &Connection,
    sql: &str,
    operation: &'static str,
    map: F,
) -> QueryResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn
        .prepare(sql)
        .map_err(PersistenceError::statement(operation))?;
    let rows = stmt
        .query_map([], map)
        .map_err(PersistenceError::statement(operation))?;
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(PersistenceError::statement(operation))
}

/// Single-row KPI summary; zero counts and no averages before the first load
pub fn kpi_summary(store: &SqliteStore) -> QueryResult<KpiSummary> {
    if !store.table_exists()? {
        return Ok(KpiSummary::default());
    }
    let sql = render_sql(KPI_SUMMARY_SQL, store.table());
    store
        .connection()
        .query_row(&sql, [], |row| {
            Ok(KpiSummary {
                total_deliveries: count(row, 0)?,
                active_days: count(row, 1)?,
                avg_delivery_time_min: row.get(2)?,
                avg_agent_rating: row.get(3)?,
                areas_covered: count(row, 4)?,
            })
        })
        .map_err(PersistenceError::statement("kpi summary"))
}

/// Deliveries per weekday, Monday first
pub fn by_day_of_week(store: &SqliteStore) -> QueryResult<Vec<DayOfWeekRow>> {
    if !store.table_exists()? {
        return Ok(Vec::new());
    }
    let sql = render_sql(BY_DAY_OF_WEEK_SQL, store.table());
    fetch_all(store.connection(), &sql, "by day of week", |row| {
        Ok(DayOfWeekRow {
            order_day_name: row.get(0)?,
            order_day_of_week: row.get(1)?,
            deliveries: count(row, 2)?,
            avg_delivery_time_min: row.get(3)?,
        })
    })
}

/// Deliveries per area, busiest first
pub fn by_area(store: &SqliteStore) -> QueryResult<Vec<AreaRow>> {
    if !store.table_exists()? {
        return Ok(Vec::new());
    }
    let sql = render_sql(BY_AREA_SQL, store.table());
    fetch_all(store.connection(), &sql, "by area", |row| {
        Ok(AreaRow {
            area: row.get(0)?,
            deliveries: count(row, 1)?,
            avg_delivery_time_min: row.get(2)?,
            avg_agent_rating: row.get(3)?,
        })
    })
}

/// Deliveries per weather condition, most frequent first
pub fn weather_impact(store: &SqliteStore) -> QueryResult<Vec<WeatherRow>> {
    if !store.table_exists()? {
        return Ok(Vec::new());
    }
    let sql = render_sql(WEATHER_IMPACT_SQL, store.table());
    fetch_all(store.connection(), &sql, "weather impact", |row| {
        Ok(WeatherRow {
            weather: row.get(0)?,
            deliveries: count(row, 1)?,
            avg_delivery_time_min: row.get(2)?,
        })
    })
}

/// The ten most ordered categories
pub fn top_categories(store: &SqliteStore) -> QueryResult<Vec<CategoryRow>> {
    if !store.table_exists()? {
        return Ok(Vec::new());
    }
    let sql = render_sql(TOP_CATEGORIES_SQL, store.table());
    fetch_all(store.connection(), &sql, "top categories", |row| {
        Ok(CategoryRow {
            category: row.get(0)?,
            order_count: count(row, 1)?,
            avg_delivery_time_min: row.get(2)?,
        })
    })
}
