//! Console output utilities
//!
//! Plain-text tables for query results and data summaries.

/// Render rows as a left-aligned text table with a header rule
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(headers.to_vec()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row.iter().map(String::as_str).collect()));
    }
    out
}

/// Format an optional average for display; `NULL` when the table is empty
#[must_use]
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(
            &["area", "deliveries"],
            &[
                vec!["Metropolitian".to_string(), "3".to_string()],
                vec!["Urban".to_string(), "12".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "area           deliveries");
        assert_eq!(lines[1], "-------------  ----------");
        assert_eq!(lines[2], "Metropolitian  3");
        assert_eq!(lines[3], "Urban          12");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(124.9)), "124.90");
        assert_eq!(format_optional(None), "NULL");
    }
}
