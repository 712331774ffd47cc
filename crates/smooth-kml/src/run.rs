//! File level driver: load, process, save, report

use crate::{Document, ProcessReport, Result, Settings, kml};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Outcome of processing one file
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub process: ProcessReport,
}

impl RunReport {
    /// Output size as a percentage of the input size
    pub fn size_left_pct(&self) -> f64 {
        if self.input_bytes == 0 {
            return 100.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64 * 100.0
    }
}

/// Process the file named by `settings.input` and write the result
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn run(settings: &Settings) -> Result<RunReport> {
    let options = settings.process_options()?;
    let output = settings.output_path();

    tracing::info!("Loading {}...", settings.input.display());
    let input_bytes = fs::metadata(&settings.input)?.len();
    let mut document = Document::parse(BufReader::new(File::open(&settings.input)?))?;

    let process = kml::process(&mut document, &options)?;

    tracing::info!("Saving {}...", output.display());
    let mut sink = BufWriter::new(File::create(&output)?);
    document.write(&mut sink)?;
    sink.flush()?;

    let report = RunReport {
        input_bytes,
        output_bytes: fs::metadata(&output)?.len(),
        output,
        process,
    };

    tracing::info!(
        "Done. Output KML file size is {:.0}% of the original.",
        report.size_left_pct()
    );
    tracing::info!(
        "{:.3} kb  -->>  {:.3} kb",
        report.input_bytes as f64 / 1024.0,
        report.output_bytes as f64 / 1024.0
    );

    Ok(report)
}
