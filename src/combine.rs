//! Row-range concatenation of CSV files.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A slice of lines to copy from one source file: inclusive 0-based `start`
/// and `end`, with an optional step. An `end` beyond the file's last line is
/// clamped, not an error.
#[derive(Debug, Clone)]
pub struct CsvRange {
    pub path: PathBuf,
    pub start: usize,
    pub end: usize,
    pub step: Option<usize>,
}

impl CsvRange {
    pub fn new(path: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            path: path.into(),
            start,
            end,
            step: None,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }
}

/// Copy the given line ranges, in order, into `destination`.
///
/// An existing destination is deleted first, so repeated invocations never
/// append across calls. Within one call the destination grows monotonically
/// over the ordered ranges; repeated source lines are copied as-is. A missing
/// source file fails with the underlying not-found error, and a partially
/// written destination is left behind.
pub fn combine_csv_files(destination: impl AsRef<Path>, ranges: &[CsvRange]) -> Result<()> {
    let destination = destination.as_ref();
    if destination.exists() {
        std::fs::remove_file(destination)
            .with_context(|| format!("Failed to remove {}", destination.display()))?;
    }

    for range in ranges {
        let file = File::open(&range.path)
            .with_context(|| format!("Failed to open source file: {}", range.path.display()))?;
        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("Failed to read {}", range.path.display()))?;

        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .with_context(|| format!("Failed to open {}", destination.display()))?;
        let mut writer = BufWriter::new(out);

        if lines.is_empty() {
            continue;
        }
        let end = range.end.min(lines.len() - 1);
        let step = range.step.unwrap_or(1).max(1);
        if range.start > end {
            continue;
        }
        for line in lines[range.start..=end].iter().step_by(step) {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
    }

    Ok(())
}
