// src/analyzer.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::drivers::{AnalysisOutput, EisError, ImpedancePipeline, PlotStyle};
use crate::recorder::{load_table, store_table};

/// Where the analyzer reads from and writes to.
#[derive(Clone, Debug)]
pub struct AnalysisPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bode_plot: PathBuf,
    pub nyquist_plot: PathBuf,
    pub report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RowFailure {
    pub row: Option<usize>,
    pub message: String,
}

/// JSON summary of one analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub input: String,
    pub output: String,
    pub rows: usize,
    pub derived: usize,
    pub failures: Vec<RowFailure>,
    pub plots: Vec<String>,
    pub detection: bool,
}

impl AnalysisReport {
    fn new(paths: &AnalysisPaths, output: &AnalysisOutput, plots: Vec<String>) -> Self {
        let failures = output
            .frame
            .failures
            .iter()
            .map(|err| RowFailure {
                row: match err {
                    EisError::Division { row } => *row,
                    _ => None,
                },
                message: err.to_string(),
            })
            .collect();
        Self {
            input: paths.input.display().to_string(),
            output: paths.output.display().to_string(),
            rows: output.frame.total_rows(),
            derived: output.frame.rows.len(),
            failures,
            plots,
            detection: output.detected,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), EisError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| EisError::file_access(path, e))
    }
}

/// Loads the table, writes it back with impedance columns, saves both plots
/// and returns the run summary.
pub fn run_analysis(paths: &AnalysisPaths, style: PlotStyle) -> Result<AnalysisReport, EisError> {
    let mut table = load_table(&paths.input)?;
    info!("📂 loaded {} rows from {}", table.len(), paths.input.display());

    let output = ImpedancePipeline::new(style).process(&mut table)?;
    store_table(&table, &paths.output)?;
    info!("💾 results saved to {}", paths.output.display());

    let mut plots = Vec::new();
    for (png, path) in [
        (&output.bode_png, &paths.bode_plot),
        (&output.nyquist_png, &paths.nyquist_plot),
    ] {
        if let Some(png) = png {
            fs::write(path, png).map_err(|e| EisError::file_access(path, e))?;
            info!("🖼 plot saved to {}", path.display());
            plots.push(path.display().to_string());
        }
    }

    let report = AnalysisReport::new(paths, &output, plots);
    if let Some(path) = &paths.report {
        report.write_json(path)?;
        info!("report written to {}", path.display());
    }
    Ok(report)
}
