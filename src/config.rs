//! Optional TOML settings.
//!
//! Every key is optional; anything left out falls back to the built-in
//! defaults, and command-line flags win over both:
//!
//! ```toml
//! # eis.toml
//! [paths]
//! data_file = "eis_data.csv"
//! results_file = "eis_results.csv"
//! bode_plot = "bode_plot.png"
//! nyquist_plot = "nyquist_plot.png"
//!
//! [plot]
//! width = 1200
//! height = 900
//! palette = [[31, 119, 180], [214, 39, 40]]
//! ```
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::drivers::{EisError, PlotStyle, PlotStyleConfig};

pub const DEFAULT_DATA_FILE: &str = "eis_data.csv";
pub const DEFAULT_RESULTS_FILE: &str = "eis_results.csv";
pub const DEFAULT_BODE_PLOT: &str = "bode_plot.png";
pub const DEFAULT_NYQUIST_PLOT: &str = "nyquist_plot.png";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub plot: PlotStyleConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub data_file: Option<PathBuf>,
    pub results_file: Option<PathBuf>,
    pub bode_plot: Option<PathBuf>,
    pub nyquist_plot: Option<PathBuf>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, EisError> {
        let content = std::fs::read_to_string(path).map_err(|e| EisError::file_access(path, e))?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, EisError> {
        toml::from_str(content).map_err(|e| EisError::Config(e.to_string()))
    }

    pub fn data_file(&self) -> PathBuf {
        self.paths
            .data_file
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_FILE.into())
    }

    pub fn results_file(&self) -> PathBuf {
        self.paths
            .results_file
            .clone()
            .unwrap_or_else(|| DEFAULT_RESULTS_FILE.into())
    }

    pub fn bode_plot(&self) -> PathBuf {
        self.paths
            .bode_plot
            .clone()
            .unwrap_or_else(|| DEFAULT_BODE_PLOT.into())
    }

    pub fn nyquist_plot(&self) -> PathBuf {
        self.paths
            .nyquist_plot
            .clone()
            .unwrap_or_else(|| DEFAULT_NYQUIST_PLOT.into())
    }

    pub fn plot_style(&self) -> Result<PlotStyle, EisError> {
        PlotStyle::from_config(&self.plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.data_file(), PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.results_file(), PathBuf::from(DEFAULT_RESULTS_FILE));
        assert_eq!(config.bode_plot(), PathBuf::from(DEFAULT_BODE_PLOT));
        assert_eq!(config.nyquist_plot(), PathBuf::from(DEFAULT_NYQUIST_PLOT));
        assert!(config.plot_style().unwrap().annotate);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [paths]
            data_file = "lab/run1.csv"

            [plot]
            width = 1200
            annotate = false
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.data_file(), PathBuf::from("lab/run1.csv"));
        assert_eq!(config.results_file(), PathBuf::from(DEFAULT_RESULTS_FILE));
        let style = config.plot_style().unwrap();
        assert_eq!(style.width, 1200);
        assert!(!style.annotate);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_str("[paths]\ndata = \"x.csv\"\n").unwrap_err();
        assert!(matches!(err, EisError::Config(_)));
    }

    #[test]
    fn misspelled_plot_key_is_rejected() {
        let err = Config::from_str("[plot]\nwidht = 1200\n").unwrap_err();
        assert!(matches!(err, EisError::Config(_)));
    }
}
