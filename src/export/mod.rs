//! CSV export of acquired samples
//!
//! One file per day, named `<YYYY-MM-DD>.csv`, written into the configured
//! export directory and overwritten on every export. Layout:
//!
//! ```text
//! Time Stamp,Value,Standard Deviation,Mean,Variance
//! 14:03:07,42.5
//! 14:03:08,43.0
//! ,,0.25,42.75,0.0625
//! ```
//!
//! Statistics are population statistics over the exported values. With no
//! samples the trailer row keeps its shape but the statistic cells are empty.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::analysis::SummaryStats;
use crate::config::{ExportConfig, ExportScope};
use crate::error::{Result, ResultExt};
use crate::session::AcquisitionSession;
use crate::types::Sample;

/// Header row of every export
pub const CSV_HEADER: [&str; 5] = ["Time Stamp", "Value", "Standard Deviation", "Mean", "Variance"];

/// strftime pattern of the row timestamps (24-hour)
pub const ROW_TIME_FORMAT: &str = "%H:%M:%S";

/// File name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}.csv", date.format("%Y-%m-%d"))
}

/// Format a value the way it appears in the CSV (`2.0`, not `2`)
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// Write the CSV layout for `samples` to `writer`
pub fn write_csv<W: Write>(writer: W, samples: &[Sample]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    csv.write_record(CSV_HEADER)?;
    for sample in samples {
        csv.write_record([
            sample.timestamp.format(ROW_TIME_FORMAT).to_string(),
            format_value(sample.value),
        ])?;
    }

    let trailer = match SummaryStats::from_values(samples.iter().map(|s| s.value)) {
        Some(stats) => [
            String::new(),
            String::new(),
            format_value(stats.std_dev),
            format_value(stats.mean),
            format_value(stats.variance),
        ],
        None => Default::default(),
    };
    csv.write_record(&trailer)?;
    csv.flush()?;
    Ok(())
}

/// Writes the session's samples to the dated CSV file
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
    scope: ExportScope,
}

impl Exporter {
    pub fn new(directory: impl Into<PathBuf>, scope: ExportScope) -> Self {
        Self {
            directory: directory.into(),
            scope,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.directory.clone(), config.scope)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
        tracing::info!("Export directory set to {}", self.directory.display());
    }

    pub fn scope(&self) -> ExportScope {
        self.scope
    }

    /// Export the session; returns the path written
    pub fn export(&self, session: &AcquisitionSession, today: NaiveDate) -> Result<PathBuf> {
        let samples = session.export_samples(self.scope);
        let path = self.directory.join(export_file_name(today));

        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(file, &samples).with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("Data saved to {} ({} samples)", path.display(), samples.len());
        Ok(path)
    }
}
