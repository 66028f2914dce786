//! Log lines for the row transfers of a run
//!
//! Every run moves rows three times: off the raw extract, into the cleaned
//! CSV and into the store. Each transfer logs once when it starts and once
//! with the row count when it is done.

use std::path::Path;
use std::time::Duration;

/// A movement of rows between the pipeline and a file or database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Raw extract into memory
    Read,
    /// Cleaned table out to CSV
    Export,
    /// Cleaned table into the store
    Load,
}

impl Transfer {
    fn started(self) -> &'static str {
        match self {
            Self::Read => "Reading raw extract from",
            Self::Export => "Exporting cleaned table to",
            Self::Load => "Loading cleaned table into",
        }
    }

    fn completed(self) -> (&'static str, &'static str) {
        match self {
            Self::Read => ("Read", "from"),
            Self::Export => ("Exported", "to"),
            Self::Load => ("Loaded", "into"),
        }
    }
}

pub(crate) fn start_message(transfer: Transfer, path: &Path) -> String {
    format!("{} {}", transfer.started(), path.display())
}

pub(crate) fn completion_message(
    transfer: Transfer,
    path: &Path,
    rows: usize,
    elapsed: Option<Duration>,
) -> String {
    let (verb, preposition) = transfer.completed();
    let noun = if rows == 1 { "row" } else { "rows" };
    let mut message = format!("{verb} {rows} {noun} {preposition} {}", path.display());
    if let Some(duration) = elapsed {
        message.push_str(&format!(" in {duration:?}"));
    }
    message
}

pub fn log_operation_start(transfer: Transfer, path: &Path) {
    log::info!("{}", start_message(transfer, path));
}

/// Log the row count of a finished transfer
pub fn log_operation_complete(
    transfer: Transfer,
    path: &Path,
    rows: usize,
    elapsed: Option<Duration>,
) {
    log::info!("{}", completion_message(transfer, path, rows, elapsed));
}

/// Log a warning, optionally naming the file it concerns
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
