//! Domain models for the delivery pipeline
//!
//! [`RawDeliveryRecord`] is a row as it appears in the extract, with every
//! field still a string. [`DeliveryRecord`] is a validated row; it is only
//! built by the cleaner, after coercion, deduplication and imputation.

pub mod delivery;
pub mod raw;

pub use delivery::{CleanedTable, DeliveryRecord};
pub use raw::{RawDeliveryRecord, RawRow, RawTable, is_missing_token};
