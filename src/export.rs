//! Writing the cleaned table as CSV

use std::path::Path;
use std::time::Instant;

use crate::error::util::ensure_parent_dir;
use crate::error::{DeliveryError, Result};
use crate::models::CleanedTable;
use crate::utils::logging::{Transfer, log_operation_complete, log_operation_start};

/// Write `table` to `path` with a header row, one line per record
///
/// Missing optional values are written as empty cells.
pub fn write_cleaned_csv(table: &CleanedTable, path: &Path) -> Result<usize> {
    log_operation_start(Transfer::Export, path);
    let start = Instant::now();
    ensure_parent_dir(path)?;

    let output_error = |source: std::io::Error| DeliveryError::Output {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| output_error(e.into()))?;
    for record in table.iter() {
        writer.serialize(record).map_err(|e| output_error(e.into()))?;
    }
    writer.flush().map_err(output_error)?;

    log_operation_complete(Transfer::Export, path, table.len(), Some(start.elapsed()));
    Ok(table.len())
}
