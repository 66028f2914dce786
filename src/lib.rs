//! Batch ETL and KPI queries for last-mile delivery data.
//!
//! Reads a raw delivery extract, cleans it into typed records, persists the
//! result into SQLite with a full refresh, and answers five aggregate queries.

pub mod analysis;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod store;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{CleaningConfig, DedupPolicy, ImputationKey, PipelineConfig, StoreConfig};
pub use error::{
    ConfigError, DeliveryError, InputError, PersistenceError, Result, RowValidationError,
};
pub use models::{CleanedTable, DeliveryRecord, RawDeliveryRecord, RawTable};

// Pipeline steps
pub use cleaning::clean;
pub use export::write_cleaned_csv;
pub use loader::{read_raw, read_raw_csv};
pub use pipeline::{RunOutcome, extract, run};
pub use report::{LoadStatus, ValidationReport};
pub use store::{SqliteStore, load};

// Queries
pub use analysis::{AnalysisReport, Query, QueryOutput};
