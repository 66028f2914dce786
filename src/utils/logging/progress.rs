//! Progress reporting for the store load, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Template of the row insertion progress bar
pub const LOAD_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create the progress bar shown while inserting rows
///
/// # Arguments
/// * `length` - Number of rows to insert
/// * `visible` - When false a hidden bar is returned
#[must_use]
pub fn create_load_progress_bar(length: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(LOAD_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("inserting rows");
    pb
}

/// Finish a progress bar with a completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let pb = create_load_progress_bar(10, false);
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        finish_progress_bar(&pb, Some("done"));
        assert!(pb.is_finished());
    }
}
