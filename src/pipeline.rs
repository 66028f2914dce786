//! One batch run: extract, clean, export, load, report

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use log::{error, info};

use crate::cleaning::clean;
use crate::config::PipelineConfig;
use crate::error::{InputError, Result};
use crate::export::write_cleaned_csv;
use crate::loader::read_raw_csv;
use crate::models::RawTable;
use crate::report::{LoadStatus, ValidationReport};
use crate::store;
use crate::utils::logging::log_warning;

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: ValidationReport,
    /// Rows committed to the store; `None` when the load was skipped
    pub loaded_rows: Option<usize>,
    pub processed_dataset: PathBuf,
    pub report_path: PathBuf,
}

/// Read the raw extract named by `config`
pub fn extract(config: &PipelineConfig) -> std::result::Result<RawTable, InputError> {
    read_raw_csv(&config.raw_dataset, config.delimiter)
}

/// Run the whole batch
///
/// An [`InputError`] aborts before the store is opened. A failed load is
/// rolled back, recorded in the report, and returned after the report has
/// been written.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    config.validate()?;
    let started_at = Utc::now();
    let start = Instant::now();

    let raw = extract(config)?;
    let (cleaned, mut report) = clean(&raw, &config.cleaning);
    report.source = Some(config.raw_dataset.clone());
    report.generated_at = Some(started_at);
    info!(
        "Cleaned {} input rows into {} records ({} duplicates, {} rejected)",
        report.input_rows,
        report.output_rows,
        report.duplicates_removed,
        report.rejected_rows()
    );
    if report.rejected_rows() > 0 {
        log_warning(
            &format!("{} rows rejected while cleaning", report.rejected_rows()),
            Some(&config.raw_dataset),
        );
    }

    write_cleaned_csv(&cleaned, &config.processed_dataset)?;

    let load_result = if config.skip_load {
        report.load_status = LoadStatus::Skipped;
        Ok(None)
    } else {
        if cleaned.is_empty() {
            log_warning(
                "No rows survived cleaning; the load replaces the table with an empty one",
                Some(&config.store.path),
            );
        }
        match store::load(&cleaned, &config.store) {
            Ok(rows) => {
                report.load_status = LoadStatus::Succeeded { rows };
                Ok(Some(rows))
            }
            Err(e) => {
                error!("Load into {} failed: {e}", config.store.path.display());
                report.load_status = LoadStatus::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    };

    report.duration_ms = Some(start.elapsed().as_millis());
    let json_path = config.report.write_json.then(|| config.report.json_path());
    let written = report.write(&config.report.report_path, json_path.as_deref());

    // The load error takes precedence over a failure to write the report
    let loaded_rows = match (load_result, written) {
        (Err(load_error), Err(write_error)) => {
            error!("Validation report could not be written: {write_error}");
            return Err(load_error);
        }
        (Err(load_error), Ok(())) => return Err(load_error),
        (Ok(_), Err(write_error)) => return Err(write_error),
        (Ok(rows), Ok(())) => rows,
    };

    Ok(RunOutcome {
        report,
        loaded_rows,
        processed_dataset: config.processed_dataset.clone(),
        report_path: config.report.report_path.clone(),
    })
}
