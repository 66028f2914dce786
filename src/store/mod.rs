//! SQLite-backed delivery store
//!
//! The cleaned table is persisted with a full refresh: drop, create, insert
//! and verify all happen inside one transaction, so a reader either sees the
//! previous committed table or the complete new one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::config::StoreConfig;
use crate::error::{PersistenceError, Result};
use crate::models::CleanedTable;
use crate::utils::logging::{
    Transfer, create_load_progress_bar, finish_progress_bar, log_operation_complete,
    log_operation_start,
};

/// Column definitions of the deliveries table
const COLUMNS_DDL: &str = "
    order_id          TEXT PRIMARY KEY,
    order_date        TEXT NOT NULL,
    order_year        INTEGER NOT NULL,
    order_month       INTEGER NOT NULL,
    order_day_of_week INTEGER NOT NULL CHECK (order_day_of_week BETWEEN 1 AND 7),
    order_day_name    TEXT NOT NULL,
    delivery_time     REAL NOT NULL CHECK (delivery_time >= 0),
    agent_rating      REAL NOT NULL,
    area              TEXT NOT NULL,
    weather           TEXT NOT NULL,
    category          TEXT NOT NULL,
    agent_age         INTEGER,
    store_latitude    REAL,
    store_longitude   REAL,
    drop_latitude     REAL,
    drop_longitude    REAL,
    order_time        TEXT,
    pickup_time       TEXT,
    traffic           TEXT,
    vehicle           TEXT,
    loaded_at         TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP";

const INSERT_COLUMNS: &str = "order_id, order_date, order_year, order_month, order_day_of_week, \
     order_day_name, delivery_time, agent_rating, area, weather, category, agent_age, \
     store_latitude, store_longitude, drop_latitude, drop_longitude, order_time, pickup_time, \
     traffic, vehicle";

/// A connection to the delivery database and the table it manages
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
    table: String,
    show_progress: bool,
}

impl SqliteStore {
    /// Open (or create) the database file named by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        create_location(&config.path)?;

        let conn = Connection::open(&config.path).map_err(|source| PersistenceError::Connect {
            path: config.path.clone(),
            source,
        })?;
        debug!("Opened store at {}", config.path.display());

        Ok(Self::with_connection(conn, config))
    }

    /// Open the database for queries without creating anything on disk
    ///
    /// A database file that does not exist yet behaves like one that was
    /// never loaded: an empty private database stands in for it.
    pub fn open_read_only(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let connect_error = |source: rusqlite::Error| PersistenceError::Connect {
            path: config.path.clone(),
            source,
        };

        let conn = if config.path.is_file() {
            Connection::open_with_flags(
                &config.path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(connect_error)?
        } else {
            debug!(
                "No database at {}, querying an empty store",
                config.path.display()
            );
            Connection::open_in_memory().map_err(connect_error)?
        };
        debug!("Opened store read-only at {}", config.path.display());

        Ok(Self::with_connection(conn, config))
    }

    fn with_connection(conn: Connection, config: &StoreConfig) -> Self {
        Self {
            conn,
            path: config.path.clone(),
            table: config.table.clone(),
            show_progress: config.show_progress,
        }
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory(table: &str) -> Result<Self> {
        let config = StoreConfig {
            path: PathBuf::from(":memory:"),
            table: table.to_string(),
            show_progress: false,
        };
        config.validate()?;

        let conn = Connection::open_in_memory().map_err(|source| PersistenceError::Connect {
            path: config.path.clone(),
            source,
        })?;
        Ok(Self {
            conn,
            path: config.path,
            table: config.table,
            show_progress: false,
        })
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read access for the analysis queries
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the deliveries table has been created
    pub fn table_exists(&self) -> std::result::Result<bool, PersistenceError> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![self.table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(PersistenceError::statement("check table"))
    }

    /// Committed rows in the deliveries table; zero when it does not exist
    pub fn row_count(&self) -> std::result::Result<usize, PersistenceError> {
        if !self.table_exists()? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(PersistenceError::statement("count rows"))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Replace the whole table with `cleaned` in one transaction
    ///
    /// On any error the transaction is rolled back and the previously
    /// committed table is left as it was.
    pub fn replace_all(
        &mut self,
        cleaned: &CleanedTable,
    ) -> std::result::Result<usize, PersistenceError> {
        log_operation_start(Transfer::Load, &self.path);
        let start = Instant::now();
        let table = self.table.clone();
        let pb = create_load_progress_bar(cleaned.len() as u64, self.show_progress);

        let tx = self
            .conn
            .transaction()
            .map_err(PersistenceError::statement("begin transaction"))?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({COLUMNS_DDL}\n);"
        ))
        .map_err(PersistenceError::statement("recreate table"))?;

        {
            let mut insert = tx
                .prepare(&format!(
                    "INSERT INTO {table} ({INSERT_COLUMNS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
                ))
                .map_err(PersistenceError::statement("prepare insert"))?;

            for record in cleaned.iter() {
                insert
                    .execute(params![
                        record.order_id,
                        record.order_date.to_string(),
                        record.order_year,
                        record.order_month,
                        record.order_day_of_week,
                        record.order_day_name,
                        record.delivery_time,
                        record.agent_rating,
                        record.area,
                        record.weather,
                        record.category,
                        record.agent_age,
                        record.store_latitude,
                        record.store_longitude,
                        record.drop_latitude,
                        record.drop_longitude,
                        record.order_time,
                        record.pickup_time,
                        record.traffic,
                        record.vehicle,
                    ])
                    .map_err(PersistenceError::statement("insert row"))?;
                pb.inc(1);
            }
        }

        let found: i64 = tx
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(PersistenceError::statement("verify row count"))?;
        let found = usize::try_from(found).unwrap_or_default();
        if found != cleaned.len() {
            return Err(PersistenceError::RowCountMismatch {
                expected: cleaned.len(),
                found,
            });
        }

        tx.commit()
            .map_err(PersistenceError::statement("commit transaction"))?;
        finish_progress_bar(&pb, Some("load committed"));

        log_operation_complete(Transfer::Load, &self.path, found, Some(start.elapsed()));
        info!("Verified {found} rows in table {table}");
        Ok(found)
    }
}

/// Create the directory that will hold the database file
fn create_location(path: &Path) -> std::result::Result<(), PersistenceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Unreachable {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Full-refresh load of `cleaned` into the store described by `config`
pub fn load(cleaned: &CleanedTable, config: &StoreConfig) -> Result<usize> {
    let mut store = SqliteStore::open(config)?;
    Ok(store.replace_all(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryRecord;
    use chrono::NaiveDate;

    fn record(id: &str, day: u32) -> DeliveryRecord {
        DeliveryRecord::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2022, 3, day).unwrap(),
            100.0,
            4.5,
            "Urban".to_string(),
            "Sunny".to_string(),
            "Grocery".to_string(),
        )
    }

    #[test]
    fn test_replace_all_and_count() {
        let mut store = SqliteStore::open_in_memory("deliveries").unwrap();
        assert!(!store.table_exists().unwrap());
        assert_eq!(store.row_count().unwrap(), 0);

        let cleaned = CleanedTable::new(vec![record("1", 1), record("2", 2)]);
        assert_eq!(store.replace_all(&cleaned).unwrap(), 2);
        assert!(store.table_exists().unwrap());

        // Full refresh, not append
        let smaller = CleanedTable::new(vec![record("3", 3)]);
        assert_eq!(store.replace_all(&smaller).unwrap(), 1);
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[test]
    fn test_stored_values_round_trip() {
        let mut store = SqliteStore::open_in_memory("deliveries").unwrap();
        let mut rec = record("1", 19);
        rec.traffic = Some("High".to_string());
        store.replace_all(&CleanedTable::new(vec![rec])).unwrap();

        let (date, dow, name, traffic, vehicle): (String, i64, String, Option<String>, Option<String>) = store
            .connection()
            .query_row(
                "SELECT order_date, order_day_of_week, order_day_name, traffic, vehicle FROM deliveries",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(date, "2022-03-19");
        assert_eq!(dow, 6);
        assert_eq!(name, "Saturday");
        assert_eq!(traffic.as_deref(), Some("High"));
        assert_eq!(vehicle, None);
    }

    #[test]
    fn test_failed_load_keeps_previous_table() {
        let mut store = SqliteStore::open_in_memory("deliveries").unwrap();
        store
            .replace_all(&CleanedTable::new(vec![record("1", 1), record("2", 2), record("3", 3)]))
            .unwrap();

        // Duplicate primary key makes the insert fail mid-transaction
        let broken = CleanedTable::new(vec![record("9", 1), record("9", 2)]);
        let err = store.replace_all(&broken).unwrap_err();
        assert!(matches!(err, PersistenceError::Statement { operation: "insert row", .. }));

        assert_eq!(store.row_count().unwrap(), 3);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        assert!(SqliteStore::open_in_memory("deliveries; DROP TABLE x").is_err());
    }

    #[test]
    fn test_load_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::at(dir.path().join("nested").join("deliveries.db"));
        let loaded = load(&CleanedTable::new(vec![record("1", 1)]), &config).unwrap();
        assert_eq!(loaded, 1);
        assert!(config.path.exists());

        let reopened = SqliteStore::open(&config).unwrap();
        assert_eq!(reopened.row_count().unwrap(), 1);
    }

    #[test]
    fn test_open_under_regular_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let config = StoreConfig::at(blocker.join("sub").join("deliveries.db"));
        let err = SqliteStore::open(&config).unwrap_err();
        assert!(
            matches!(
                err,
                crate::error::DeliveryError::Persistence(PersistenceError::Unreachable { .. })
            ),
            "got {err}"
        );
    }

    #[test]
    fn test_read_only_open_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::at(dir.path().join("missing").join("deliveries.db"));

        let store = SqliteStore::open_read_only(&config).unwrap();
        assert!(!store.table_exists().unwrap());
        assert_eq!(store.row_count().unwrap(), 0);
        assert!(!config.path.exists());
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_read_only_store_sees_committed_rows_and_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::at(dir.path().join("deliveries.db"));
        load(&CleanedTable::new(vec![record("1", 1), record("2", 2)]), &config).unwrap();

        let mut store = SqliteStore::open_read_only(&config).unwrap();
        assert_eq!(store.row_count().unwrap(), 2);

        let err = store
            .replace_all(&CleanedTable::new(vec![record("3", 3)]))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Statement { .. }));
        assert_eq!(store.row_count().unwrap(), 2);
    }
}
