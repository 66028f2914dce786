//! Validation report of a pipeline run
//!
//! The report is the record of what a run did: how many rows came in, which
//! were rejected and why, what was imputed, and whether the load committed.
//! It is filled by the cleaner, completed by the runner, and written even
//! when the load fails.

pub mod processed;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{DedupPolicy, ImputationKey};
use crate::error::util::ensure_parent_dir;
use crate::error::{DeliveryError, Result, RowValidationError};

/// Rejections listed individually in the text report
const MAX_LISTED_REJECTIONS: usize = 20;

/// Null and coercion statistics for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    /// Cells that were empty or a missing-value token in the extract
    pub missing_in_extract: usize,
    /// Cells present but not parseable as the field's type
    pub unparseable: usize,
    /// Cells parsed but outside the valid range
    pub out_of_range: usize,
    /// Nulls in the deduplicated rows, before imputation
    pub nulls_before_imputation: usize,
    /// Values filled by imputation
    pub imputed: usize,
    /// Nulls in the cleaned output
    pub nulls_after: usize,
}

/// Outcome of the store load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// The cleaner ran but no load has been attempted yet
    #[default]
    NotAttempted,
    /// Load disabled by configuration
    Skipped,
    /// Full refresh committed
    Succeeded { rows: usize },
    /// Load failed and was rolled back
    Failed { reason: String },
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "not attempted"),
            Self::Skipped => write!(f, "skipped"),
            Self::Succeeded { rows } => write!(f, "succeeded ({rows} rows committed)"),
            Self::Failed { reason } => write!(f, "FAILED: {reason}"),
        }
    }
}

/// Everything a run learned about its input and output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Raw extract, when the table was read from a file
    pub source: Option<PathBuf>,
    pub generated_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u128>,
    pub imputation_key: ImputationKey,
    pub dedup_policy: DedupPolicy,
    /// Data lines in the extract, decoded or not
    pub input_rows: usize,
    /// Rows in the cleaned table
    pub output_rows: usize,
    pub duplicates_removed: usize,
    /// Rejected row count per reason
    pub rejected: BTreeMap<String, usize>,
    /// Every rejected row, in line order
    pub rejections: Vec<RowValidationError>,
    /// Per-field statistics keyed by lowercase column name
    pub fields: BTreeMap<String, FieldStats>,
    /// Header columns not used by the cleaner
    pub ignored_columns: Vec<String>,
    /// Distinct `order_id`s divided by output rows
    pub order_id_unique_ratio: f64,
    /// Share of null cells in the cleaned output, in percent
    pub output_missing_pct: f64,
    pub load_status: LoadStatus,
}

impl ValidationReport {
    /// Record a rejected row
    pub fn reject(&mut self, error: RowValidationError) {
        *self.rejected.entry(error.reason().to_string()).or_insert(0) += 1;
        self.rejections.push(error);
    }

    /// Total rows excluded for any reason other than deduplication
    #[must_use]
    pub fn rejected_rows(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Statistics for `field`, created on first use
    pub fn field_mut(&mut self, field: &str) -> &mut FieldStats {
        self.fields.entry(field.to_string()).or_default()
    }

    #[must_use]
    pub fn field(&self, field: &str) -> Option<&FieldStats> {
        self.fields.get(field)
    }

    /// Whether every input row is accounted for as output, duplicate or rejection
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.input_rows == self.output_rows + self.duplicates_removed + self.rejected_rows()
    }

    /// Write the text report, and its JSON sibling when `json_path` is given
    pub fn write(&self, text_path: &Path, json_path: Option<&Path>) -> Result<()> {
        ensure_parent_dir(text_path)?;
        fs::write(text_path, self.to_string()).map_err(|source| DeliveryError::Output {
            path: text_path.to_path_buf(),
            source,
        })?;

        if let Some(json_path) = json_path {
            ensure_parent_dir(json_path)?;
            let output_error = |source| DeliveryError::Output {
                path: json_path.to_path_buf(),
                source,
            };
            let json = serde_json::to_string_pretty(self)
                .map_err(|e| output_error(std::io::Error::from(e)))?;
            fs::write(json_path, json).map_err(output_error)?;
        }

        log::info!("Validation report written to {}", text_path.display());
        Ok(())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "DELIVERIES DATA - VALIDATION REPORT")?;
        writeln!(f, "{rule}")?;

        if let Some(source) = &self.source {
            writeln!(f, "Source:              {}", source.display())?;
        }
        if let Some(generated_at) = &self.generated_at {
            writeln!(f, "Generated at:        {}", generated_at.to_rfc3339())?;
        }
        if let Some(duration_ms) = self.duration_ms {
            writeln!(f, "Duration:            {duration_ms} ms")?;
        }
        writeln!(f, "Imputation grouping: {:?}", self.imputation_key)?;
        writeln!(f, "Duplicate policy:    {:?}", self.dedup_policy)?;

        writeln!(f, "\nRows:")?;
        writeln!(f, "  Input rows:         {}", self.input_rows)?;
        writeln!(f, "  Output rows:        {}", self.output_rows)?;
        writeln!(f, "  Duplicates removed: {}", self.duplicates_removed)?;
        writeln!(f, "  Rejected rows:      {}", self.rejected_rows())?;
        for (reason, count) in &self.rejected {
            writeln!(f, "    {reason}: {count}")?;
        }

        writeln!(f, "\nFields:")?;
        writeln!(
            f,
            "  {:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "field", "missing", "unparse", "range", "before", "imputed", "after"
        )?;
        for (name, stats) in &self.fields {
            writeln!(
                f,
                "  {:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
                name,
                stats.missing_in_extract,
                stats.unparseable,
                stats.out_of_range,
                stats.nulls_before_imputation,
                stats.imputed,
                stats.nulls_after
            )?;
        }

        if !self.ignored_columns.is_empty() {
            writeln!(f, "\nIgnored columns: {}", self.ignored_columns.join(", "))?;
        }

        writeln!(f, "\nChecks:")?;
        writeln!(
            f,
            "  order_id unique ratio: {:.2}%",
            self.order_id_unique_ratio * 100.0
        )?;
        writeln!(f, "  Missing percentage:    {:.2}%", self.output_missing_pct)?;

        if !self.rejections.is_empty() {
            writeln!(f, "\nRejected rows:")?;
            for rejection in self.rejections.iter().take(MAX_LISTED_REJECTIONS) {
                writeln!(f, "  - {rejection}")?;
            }
            if self.rejections.len() > MAX_LISTED_REJECTIONS {
                writeln!(
                    f,
                    "  ... and {} more",
                    self.rejections.len() - MAX_LISTED_REJECTIONS
                )?;
            }
        }

        writeln!(f, "\nLoad status: {}", self.load_status)?;
        write!(f, "{rule}")
    }
}
