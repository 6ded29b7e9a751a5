use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum EisError {
    #[error("invalid input for {field}: {value:?}")]
    InputParse { field: String, value: String },
    #[error("{}", division_message(.row))]
    Division { row: Option<usize> },
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("table is missing required column `{0}`")]
    MissingColumn(String),
    #[error("row {row} has {cells} cells but the header has {columns} columns")]
    RowWidth {
        row: usize,
        cells: usize,
        columns: usize,
    },
    #[error("sample {0} has no measurements")]
    EmptySample(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}
impl EisError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EisError::FileAccess {
            path: path.into(),
            source,
        }
    }
    /// Attaches a row index to a division error; other errors pass through.
    pub fn at_row(self, index: usize) -> Self {
        match self {
            EisError::Division { .. } => EisError::Division { row: Some(index) },
            other => other,
        }
    }
}
fn division_message(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!("row {row}: recorded current is zero or too small, impedance is undefined"),
        None => "recorded current is zero or too small, impedance is undefined".to_string(),
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for EisError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        EisError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for EisError {
    fn from(value: image::ImageError) -> Self {
        EisError::Plot(value.to_string())
    }
}
