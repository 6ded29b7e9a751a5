use log::{debug, warn};

use crate::drivers::error::EisError;
use crate::drivers::impedance::{compute_impedance, Impedance};

/// Columns every analysis table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    "frequency",
    "applied_potential",
    "recorded_current",
    "phase_angle",
];
pub const REAL_Z_COLUMN: &str = "real_Z";
pub const IMAG_Z_COLUMN: &str = "imag_Z";

/// One table row: the raw cells plus the four numeric inputs of the impedance math.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRow {
    pub cells: Vec<String>,
    pub frequency: f64,
    pub applied_potential: f64,
    pub recorded_current: f64,
    pub phase_angle: f64,
}

/// Whole analysis table held in memory. Extra columns ride along untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisTable {
    pub headers: Vec<String>,
    pub rows: Vec<AnalysisRow>,
}

impl AnalysisTable {
    pub fn from_records(
        headers: Vec<String>,
        records: impl IntoIterator<Item = Vec<String>>,
    ) -> Result<Self, EisError> {
        let mut positions = [0usize; 4];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = column_index(&headers, name)
                .ok_or_else(|| EisError::MissingColumn(name.to_string()))?;
        }
        let mut rows = Vec::new();
        for (index, cells) in records.into_iter().enumerate() {
            // 多出的单元格没有列名，写回时会被覆盖
            if cells.len() > headers.len() {
                return Err(EisError::RowWidth {
                    row: index,
                    cells: cells.len(),
                    columns: headers.len(),
                });
            }
            let [frequency, applied_potential, recorded_current, phase_angle] =
                positions.map(|pos| cell_value(&cells, pos, index, &headers[pos]));
            rows.push(AnalysisRow {
                frequency: frequency?,
                applied_potential: applied_potential?,
                recorded_current: recorded_current?,
                phase_angle: phase_angle?,
                cells,
            });
        }
        debug!("loaded analysis table: {} columns, {} rows", headers.len(), rows.len());
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes `real_Z` / `imag_Z` into every row, leaving both cells empty
    /// for rows whose impedance is undefined. Existing columns of the same
    /// name are overwritten in place.
    pub fn attach_impedance(&mut self, frame: &ImpedanceFrame) {
        let real_pos = self.ensure_column(REAL_Z_COLUMN);
        let imag_pos = self.ensure_column(IMAG_Z_COLUMN);
        let width = self.headers.len();
        let mut derived = frame.rows.iter().peekable();
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.cells.resize(width, String::new());
            match derived.next_if(|d| d.index == index) {
                Some(d) => {
                    row.cells[real_pos] = d.impedance.real.to_string();
                    row.cells[imag_pos] = d.impedance.imag.to_string();
                }
                None => {
                    row.cells[real_pos].clear();
                    row.cells[imag_pos].clear();
                }
            }
        }
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        column_index(&self.headers, name).unwrap_or_else(|| {
            self.headers.push(name.to_string());
            self.headers.len() - 1
        })
    }
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell_value(cells: &[String], pos: usize, row: usize, column: &str) -> Result<f64, EisError> {
    let raw = cells.get(pos).map(String::as_str).unwrap_or("");
    raw.trim().parse::<f64>().map_err(|_| EisError::InputParse {
        field: format!("row {row}, column {column}"),
        value: raw.to_string(),
    })
}

/// Derived impedance for one table row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpedanceRow {
    /// Position of the row in the source table.
    pub index: usize,
    pub frequency: f64,
    pub phase_angle: f64,
    pub impedance: Impedance,
}

/// Result of deriving impedance over a whole table.
#[derive(Debug, Default)]
pub struct ImpedanceFrame {
    /// Successfully derived rows, in table order.
    pub rows: Vec<ImpedanceRow>,
    /// Rows whose impedance is undefined, with the row index attached.
    pub failures: Vec<EisError>,
}

impl ImpedanceFrame {
    pub fn total_rows(&self) -> usize {
        self.rows.len() + self.failures.len()
    }
}

/// Runs the impedance math over every row. A bad row is recorded in
/// `failures` and skipped; it never aborts the batch.
pub fn derive_impedances(table: &AnalysisTable) -> ImpedanceFrame {
    let mut frame = ImpedanceFrame::default();
    for (index, row) in table.rows.iter().enumerate() {
        match compute_impedance(row.applied_potential, row.recorded_current, row.phase_angle) {
            Ok(impedance) => {
                debug!("row {index}: |Z| = {:.4} Ohm", impedance.magnitude());
                frame.rows.push(ImpedanceRow {
                    index,
                    frequency: row.frequency,
                    phase_angle: row.phase_angle,
                    impedance,
                })
            }
            Err(err) => {
                let err = err.at_row(index);
                warn!("skipping row: {err}");
                frame.failures.push(err);
            }
        }
    }
    frame
}

#[cfg(test)]
pub(crate) fn table_fixture(rows: &[(f64, f64, f64, f64)]) -> AnalysisTable {
    let headers = ["sample_id", "frequency", "applied_potential", "recorded_current", "phase_angle"]
        .map(String::from)
        .to_vec();
    let records = rows.iter().map(|(f, v, i, p)| {
        vec![
            "S-001".to_string(),
            f.to_string(),
            v.to_string(),
            i.to_string(),
            p.to_string(),
        ]
    });
    AnalysisTable::from_records(headers, records).unwrap()
}
