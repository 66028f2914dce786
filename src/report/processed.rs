//! Summary of an exported cleaned table
//!
//! Re-reads the processed CSV and reports its shape, per-column missing
//! values, descriptive statistics for numeric columns and a few sample rows.

use std::fmt;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;

use crate::error::util::safe_open_file;
use crate::error::InputError;

/// Rows kept as a sample
const SAMPLE_ROWS: usize = 5;

/// Descriptive statistics for a column whose present values all parse as numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values
    pub std: Option<f64>,
    pub min: f64,
    /// Quartiles, linearly interpolated between neighbouring values
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Describe `values`; `None` when there are none
    #[must_use]
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            std,
            min: values[0],
            p25: quantile(&values, 0.25),
            p50: quantile(&values, 0.5),
            p75: quantile(&values, 0.75),
            max: values[count - 1],
        })
    }
}

/// Quantile `q` of non-empty sorted `values`
fn quantile(values: &[f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    values[lower] + (values[upper] - values[lower]) * fraction
}

/// One column of the processed table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
    /// `None` when the column holds text
    pub numeric: Option<NumericSummary>,
}

/// Shape and content summary of a processed CSV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub sample: Vec<Vec<String>>,
}

impl ProcessedSummary {
    /// Total missing cells across all columns
    #[must_use]
    pub fn missing_cells(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

struct Accumulator {
    missing: usize,
    values: Vec<f64>,
    numeric: bool,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            missing: 0,
            values: Vec::new(),
            numeric: true,
        }
    }

    fn push(&mut self, cell: &str) {
        if cell.is_empty() {
            self.missing += 1;
            return;
        }
        if !self.numeric {
            return;
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => self.values.push(v),
            _ => {
                self.numeric = false;
                self.values = Vec::new();
            }
        }
    }

    fn finish(self, name: String) -> ColumnSummary {
        let numeric = if self.numeric {
            NumericSummary::from_values(self.values)
        } else {
            None
        };
        ColumnSummary {
            name,
            missing: self.missing,
            numeric,
        }
    }
}

/// Summarize the processed CSV at `path`
pub fn summarize_processed(path: &Path) -> Result<ProcessedSummary, InputError> {
    let file = safe_open_file(path, "reading processed dataset")?;
    summarize(file).map_err(|e| e.with_path(path))
}

/// Summarize a processed CSV from any reader
pub fn summarize<R: Read>(input: R) -> Result<ProcessedSummary, InputError> {
    let csv_error = |source| InputError::Csv {
        path: Default::default(),
        source,
    };
    let mut reader = ReaderBuilder::new().from_reader(input);
    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Err(InputError::Empty(Default::default()));
    }

    let mut columns: Vec<Accumulator> = headers.iter().map(|_| Accumulator::new()).collect();
    let mut sample = Vec::with_capacity(SAMPLE_ROWS);
    let mut rows = 0;

    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        for (acc, cell) in columns.iter_mut().zip(record.iter()) {
            acc.push(cell);
        }
        if sample.len() < SAMPLE_ROWS {
            sample.push(record.iter().map(str::to_string).collect());
        }
        rows += 1;
    }

    let columns = columns
        .into_iter()
        .zip(headers.iter())
        .map(|(acc, name)| acc.finish(name.to_string()))
        .collect();

    Ok(ProcessedSummary {
        rows,
        columns,
        sample,
    })
}

impl fmt::Display for ProcessedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: {} rows x {} columns", self.rows, self.columns.len())?;

        writeln!(f, "\nMissing values per column:")?;
        for column in &self.columns {
            writeln!(f, "  {:<20} {}", column.name, column.missing)?;
        }
        writeln!(f, "  Total missing: {}", self.missing_cells())?;

        writeln!(f, "\nNumeric columns:")?;
        writeln!(
            f,
            "  {:<20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for column in &self.columns {
            if let Some(n) = &column.numeric {
                let std = n.std.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"));
                writeln!(
                    f,
                    "  {:<20} {:>8} {:>10.2} {:>10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                    column.name, n.count, n.mean, std, n.min, n.p25, n.p50, n.p75, n.max
                )?;
            }
        }

        writeln!(f, "\nFirst {} rows:", self.sample.len())?;
        for row in &self.sample {
            writeln!(f, "  {}", row.join(", "))?;
        }
        Ok(())
    }
}
