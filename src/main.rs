// src/main.rs
//! EIS immunoassay recorder.
//!
//! ```bash
//! # 录入一个样本（交互式），追加到 eis_data.csv
//! eis-assay collect
//!
//! # 计算阻抗，输出 eis_results.csv + Bode / Nyquist 图
//! eis-assay analyze
//!
//! # 查看已录入的样本
//! eis-assay show
//! ```
mod analyzer;
mod collector;
mod config;
mod drivers;
mod recorder;
mod types;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use crate::analyzer::{run_analysis, AnalysisPaths};
use crate::collector::{collect_sample_data, ConsoleInput};
use crate::config::Config;
use crate::recorder::DataRecorder;
/// Record EIS immunoassay samples and derive Bode / Nyquist plots
#[derive(Parser)]
#[command(name = "eis-assay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}
#[derive(Subcommand)]
enum Commands {
    /// Enter one sample interactively and append it to the data file
    Collect {
        /// Data file to append to
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
    },
    /// Compute impedance, save results and plots, report detection
    Analyze {
        /// Table to analyze
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Results table (input columns + real_Z, imag_Z)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Bode plot PNG
        #[arg(long, value_name = "FILE")]
        bode: Option<PathBuf>,
        /// Nyquist plot PNG
        #[arg(long, value_name = "FILE")]
        nyquist: Option<PathBuf>,
        /// Also write a JSON summary of the run
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// List the samples stored in the data file
    Show {
        /// Data file to read
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
    },
}
// 入口函数
fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    match cli.command {
        Commands::Collect { data } => {
            let path = data.unwrap_or_else(|| config.data_file());
            let mut input = ConsoleInput::stdio();
            let record = collect_sample_data(&mut input).context("Sample entry aborted")?;
            let rows = DataRecorder::new(&path)
                .store(&record)
                .with_context(|| format!("Failed to store sample {}", record.sample_id))?;
            println!("💾 Saved {rows} measurement(s) to {}", path.display());
        }
        Commands::Analyze {
            input,
            output,
            bode,
            nyquist,
            report,
        } => {
            let paths = AnalysisPaths {
                input: input.unwrap_or_else(|| config.data_file()),
                output: output.unwrap_or_else(|| config.results_file()),
                bode_plot: bode.unwrap_or_else(|| config.bode_plot()),
                nyquist_plot: nyquist.unwrap_or_else(|| config.nyquist_plot()),
                report,
            };
            let style = config.plot_style().context("Invalid [plot] settings")?;
            let summary = run_analysis(&paths, style)
                .with_context(|| format!("Analysis of {} failed", paths.input.display()))?;
            if !summary.failures.is_empty() {
                eprintln!(
                    "⚠ {} row(s) skipped: recorded current is zero or too small",
                    summary.failures.len()
                );
            }
            info!("analysis done: {}/{} rows", summary.derived, summary.rows);
            println!("Detection result: {}", summary.detection);
        }
        Commands::Show { data } => {
            let path = data.unwrap_or_else(|| config.data_file());
            let samples = DataRecorder::new(&path)
                .read_samples()
                .with_context(|| format!("Failed to read {}", path.display()))?;
            for sample in &samples {
                println!(
                    "{} | {} in {} | {} | {} point(s)",
                    sample.sample_id,
                    sample.analyte,
                    sample.electrolyte,
                    sample.timestamp,
                    sample.measurements.len()
                );
                for m in &sample.measurements {
                    println!(
                        "    {:>12} Hz  {:>12} A  {:>8} °",
                        m.frequency, m.recorded_current, m.phase_angle
                    );
                }
            }
            info!("{} sample(s) in {}", samples.len(), path.display());
        }
    }
    Ok(())
}
