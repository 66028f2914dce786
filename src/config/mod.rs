//! Configuration for the delivery pipeline.
//!
//! A [`PipelineConfig`] is built once and passed explicitly to every
//! operation. It can come from defaults, a JSON file, environment variables,
//! or any mix of the three (file first, then environment).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::DateFormatConfig;

/// Environment variable naming the data directory
pub const ENV_DATA_DIR: &str = "DELIVERY_DATA_DIR";
/// Environment variable naming the raw extract
pub const ENV_RAW_DATASET: &str = "DELIVERY_RAW_DATASET";
/// Environment variable naming the SQLite database file
pub const ENV_DB_PATH: &str = "DELIVERY_DB_PATH";
/// Environment variable naming the target table
pub const ENV_TABLE: &str = "DELIVERY_TABLE";

/// Default table name for the cleaned deliveries
pub const DEFAULT_TABLE: &str = "deliveries";

/// Grouping used when imputing missing numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationKey {
    /// Median of rows with the same `category`
    #[default]
    Category,
    /// Median of rows with the same `area`
    Area,
    /// Median over all rows
    Global,
}

/// Which row survives when several share an `order_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// First occurrence in input order
    #[default]
    KeepFirst,
    /// Latest `order_date`; equal dates fall back to the first occurrence
    LatestOrderDate,
}

/// Rules applied by the cleaner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Grouping for median imputation of `delivery_time` and `agent_rating`
    pub imputation_key: ImputationKey,
    /// Tie-break for duplicate `order_id`s
    pub dedup_policy: DedupPolicy,
    /// Lowest valid agent rating (inclusive)
    pub rating_min: f64,
    /// Highest valid agent rating (inclusive)
    pub rating_max: f64,
    /// Label used for missing categorical values
    pub unknown_label: String,
    /// Date parsing for `Order_Date`
    pub date_format_config: DateFormatConfig,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            imputation_key: ImputationKey::default(),
            dedup_policy: DedupPolicy::default(),
            rating_min: 1.0,
            rating_max: 5.0,
            unknown_label: "Unknown".to_string(),
            date_format_config: DateFormatConfig::default(),
        }
    }
}

impl CleaningConfig {
    /// Whether a rating lies in the configured range
    #[must_use]
    pub fn rating_in_range(&self, rating: f64) -> bool {
        rating >= self.rating_min && rating <= self.rating_max
    }
}

/// Where the cleaned table is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Table receiving the full refresh
    pub table: String,
    /// Show a progress bar while inserting rows
    pub show_progress: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/delivery_analytics.db"),
            table: DEFAULT_TABLE.to_string(),
            show_progress: false,
        }
    }
}

impl StoreConfig {
    /// Config pointing at `path` with the default table
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The table name is spliced into SQL text, so it must be a plain identifier
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier(&self.table)
    }
}

/// Check that `name` is a plain SQL identifier
pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: "store.table",
            reason: format!("{name:?} is not a plain SQL identifier"),
        })
    }
}

/// Output artifacts of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Human-readable validation report
    pub report_path: PathBuf,
    /// Also write the report as JSON next to the text report
    pub write_json: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("data/processed/validation_report.txt"),
            write_json: false,
        }
    }
}

impl ReportConfig {
    /// Path of the JSON sibling of the text report
    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.report_path.with_extension("json")
    }
}

/// Configuration for a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw delivery extract
    pub raw_dataset: PathBuf,
    /// Cleaned CSV export
    pub processed_dataset: PathBuf,
    /// Field delimiter of the raw extract
    pub delimiter: u8,
    /// Skip the store load and only clean, export and report
    pub skip_load: bool,
    pub cleaning: CleaningConfig,
    pub store: StoreConfig,
    pub report: ReportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl PipelineConfig {
    /// Default layout rooted at `data_dir`: `raw/`, `processed/`, and the database
    #[must_use]
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            raw_dataset: data_dir.join("raw").join("amazon_delivery.csv"),
            processed_dataset: data_dir.join("processed").join("deliveries_cleaned.csv"),
            delimiter: b',',
            skip_load: false,
            cleaning: CleaningConfig::default(),
            store: StoreConfig {
                path: data_dir.join("delivery_analytics.db"),
                ..StoreConfig::default()
            },
            report: ReportConfig {
                report_path: data_dir.join("processed").join("validation_report.txt"),
                write_json: false,
            },
        }
    }

    /// Load from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults overridden by the process environment
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = match std::env::var(ENV_DATA_DIR) {
            Ok(dir) => Self::with_data_dir(dir),
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply the `DELIVERY_*` overrides found through `lookup`
    ///
    /// `DELIVERY_DATA_DIR` is not handled here since it changes every default
    /// path at once; see [`PipelineConfig::from_env`].
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_RAW_DATASET) {
            self.raw_dataset = PathBuf::from(raw);
        }
        if let Some(db) = lookup(ENV_DB_PATH) {
            self.store.path = PathBuf::from(db);
        }
        if let Some(table) = lookup(ENV_TABLE) {
            self.store.table = table;
        }
    }

    /// Check values that would otherwise fail late or unsafely
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;

        let cleaning = &self.cleaning;
        if !(cleaning.rating_min.is_finite()
            && cleaning.rating_max.is_finite()
            && cleaning.rating_min <= cleaning.rating_max)
        {
            return Err(ConfigError::InvalidValue {
                field: "cleaning.rating_min/rating_max",
                reason: format!(
                    "range [{}, {}] is empty or not finite",
                    cleaning.rating_min, cleaning.rating_max
                ),
            });
        }
        if cleaning.unknown_label.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cleaning.unknown_label",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
