//! Reading the raw delivery extract

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

use crate::error::util::safe_open_file;
use crate::error::{InputError, RowValidationError};
use crate::models::{RawDeliveryRecord, RawRow, RawTable};
use crate::schema::check_header;
use crate::utils::logging::{Transfer, log_operation_complete, log_operation_start};

/// Read a delimited extract into a [`RawTable`]
///
/// Fails when the file cannot be opened, the header lacks a required column,
/// or there are no data rows. Lines the CSV reader cannot decode are kept as
/// [`RowValidationError::Malformed`] and reading continues.
pub fn read_raw_csv(path: &Path, delimiter: u8) -> Result<RawTable, InputError> {
    log_operation_start(Transfer::Read, path);
    let start = Instant::now();

    let file = safe_open_file(path, "reading raw delivery extract")?;
    let table = read_raw(file, delimiter).map_err(|e| e.with_path(path))?;

    log_operation_complete(Transfer::Read, path, table.input_rows(), Some(start.elapsed()));
    Ok(table)
}

/// Read a delimited extract from any reader
///
/// Errors carry an empty path; [`read_raw_csv`] fills it in.
pub fn read_raw<R: Read>(input: R, delimiter: u8) -> Result<RawTable, InputError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(input);

    let raw_headers = reader
        .headers()
        .map_err(|source| InputError::Csv {
            path: Default::default(),
            source,
        })?
        .clone();

    if raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(InputError::Empty(Default::default()));
    }

    let header_report = check_header(raw_headers.iter());
    if !header_report.is_usable() {
        return Err(InputError::MissingColumns {
            path: Default::default(),
            missing: header_report.missing_required,
        });
    }
    if !header_report.missing_optional.is_empty() {
        debug!(
            "Optional columns absent from extract: {}",
            header_report.missing_optional.join(", ")
        );
    }

    // Serde field names are the lowercased headers
    let headers: StringRecord = raw_headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();

    let mut table = RawTable {
        ignored_columns: header_report.ignored,
        ..RawTable::default()
    };
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map_or(0, csv::Position::line);
                match record.deserialize::<RawDeliveryRecord>(Some(&headers)) {
                    Ok(parsed) => table.rows.push(RawRow {
                        line,
                        record: parsed,
                    }),
                    Err(e) => table.malformed.push(RowValidationError::Malformed {
                        line,
                        reason: e.to_string(),
                    }),
                }
            }
            Err(e) if e.is_io_error() => {
                return Err(InputError::Csv {
                    path: Default::default(),
                    source: e,
                });
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                warn!("Skipping malformed line {line}: {e}");
                table.malformed.push(RowValidationError::Malformed {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    if table.is_empty() {
        return Err(InputError::Empty(Default::default()));
    }
    Ok(table)
}
