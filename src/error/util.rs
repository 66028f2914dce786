//! Utility functions for error handling
//!
//! Opening files and creating output directories with errors that say what
//! the file was needed for.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{DeliveryError, InputError};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File, InputError> {
    if !path.exists() {
        return Err(InputError::io(
            path,
            format!("file not found (needed for: {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(InputError::io(
            path,
            format!("path is not a file (expected a file for: {purpose})"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied - check file permissions".to_string(),
            io::ErrorKind::NotFound => {
                "file not found - it may have been deleted during operation".to_string()
            }
            _ => format!("failed to open file for: {purpose}"),
        };
        InputError::io_with_source(path, context, e)
    })
}

/// Create the parent directory of an output file if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> Result<(), DeliveryError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|source| DeliveryError::Output {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
