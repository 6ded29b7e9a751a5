// src/recorder.rs
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::drivers::{AnalysisTable, EisError};
use crate::types::{MeasurementRow, SampleRecord, MEASUREMENT_COLUMNS};

/// Append-only CSV store, one row per (sample, measurement) pair.
///
/// No file locking: only one writer at a time is supported.
pub struct DataRecorder {
    path: PathBuf,
}

impl DataRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends every measurement of `record` and returns the number of rows
    /// written. The header goes in only when the file is empty at open time.
    pub fn store(&self, record: &SampleRecord) -> Result<usize, EisError> {
        // 没有测量点的样本不落盘（连表头也不写）
        if record.measurements.is_empty() {
            return Err(EisError::EmptySample(record.sample_id.clone()));
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EisError::file_access(&self.path, e))?;
        let is_empty = file
            .metadata()
            .map_err(|e| EisError::file_access(&self.path, e))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if is_empty {
            debug!("{} is empty, writing header", self.path.display());
            writer.write_record(MEASUREMENT_COLUMNS)?;
        }
        let rows = record.to_rows();
        for row in &rows {
            writer.serialize(row)?;
        }
        writer
            .flush()
            .map_err(|e| EisError::file_access(&self.path, e))?;
        info!(
            "💾 stored sample {} ({} rows) in {}",
            record.sample_id,
            rows.len(),
            self.path.display()
        );
        Ok(rows.len())
    }

    pub fn read_rows(&self) -> Result<Vec<MeasurementRow>, EisError> {
        let file = File::open(&self.path).map_err(|e| EisError::file_access(&self.path, e))?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<MeasurementRow>, _>>()?;
        Ok(rows)
    }

    pub fn read_samples(&self) -> Result<Vec<SampleRecord>, EisError> {
        Ok(SampleRecord::group_rows(self.read_rows()?))
    }
}

/// Appends `record` to the CSV store at `path`.
pub fn store_sample_data(record: &SampleRecord, path: impl AsRef<Path>) -> Result<usize, EisError> {
    DataRecorder::new(path.as_ref()).store(record)
}

/// Reads a whole analysis table in one go. Every row must be as wide as the
/// header.
pub fn load_table(path: impl AsRef<Path>) -> Result<AnalysisTable, EisError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EisError::file_access(path, e))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>, _>>()?;
    AnalysisTable::from_records(headers, records)
}

/// Writes a whole analysis table, replacing any existing file.
pub fn store_table(table: &AnalysisTable, path: impl AsRef<Path>) -> Result<(), EisError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| EisError::file_access(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(BufWriter::new(file));
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(&row.cells)?;
    }
    writer.flush().map_err(|e| EisError::file_access(path, e))?;
    debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::dataset::derive_impedances;
    use crate::types::{sample_fixture, MeasurementPoint};
    use tempfile::tempdir;

    fn sweep() -> Vec<MeasurementPoint> {
        vec![
            MeasurementPoint::new(1000.0, 1.2e-4, -12.5),
            MeasurementPoint::new(100.0, 9.8e-5, -33.0),
            MeasurementPoint::new(10.0, 6.1e-5, -58.25),
        ]
    }

    #[test]
    fn round_trip_reproduces_rows() {
        let dir = tempdir().unwrap();
        let recorder = DataRecorder::new(dir.path().join("eis_data.csv"));
        let record = sample_fixture(sweep());
        assert_eq!(recorder.store(&record).unwrap(), 3);

        let rows = recorder.read_rows().unwrap();
        assert_eq!(rows, record.to_rows());
        assert_eq!(rows[0].electrolyte, "PBS, pH 7.4");
        assert_eq!(recorder.read_samples().unwrap(), vec![record]);
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eis_data.csv");
        let first = sample_fixture(sweep());
        let mut second = sample_fixture(vec![MeasurementPoint::new(5.0, 1e-3, 0.0)]);
        second.sample_id = "S-002".into();
        store_sample_data(&first, &path).unwrap();
        store_sample_data(&second, &path).unwrap();
        store_sample_data(&first, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = MEASUREMENT_COLUMNS.join(",");
        assert_eq!(text.lines().next(), Some(header.as_str()));
        assert_eq!(text.lines().filter(|l| *l == header).count(), 1);
        assert_eq!(text.lines().count(), 1 + 3 + 1 + 3);

        let samples = DataRecorder::new(&path).read_samples().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].sample_id, "S-002");
    }

    #[test]
    fn empty_sample_is_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eis_data.csv");
        let err = store_sample_data(&sample_fixture(Vec::new()), &path).unwrap_err();
        assert!(matches!(err, EisError::EmptySample(ref id) if id == "S-001"));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_file_access_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("eis_data.csv");
        let err = store_sample_data(&sample_fixture(sweep()), &path).unwrap_err();
        assert!(matches!(err, EisError::FileAccess { .. }));
    }

    #[test]
    fn missing_table_is_file_access_error() {
        let dir = tempdir().unwrap();
        let err = load_table(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, EisError::FileAccess { .. }));
    }

    #[test]
    fn ragged_table_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(
            &path,
            "frequency,applied_potential,recorded_current,phase_angle\n10,5,0.5,0,note-a,note-b\n",
        )
        .unwrap();
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, EisError::Csv(_)));
    }

    #[test]
    fn stored_samples_load_as_analysis_table() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("eis_data.csv");
        let mut record = sample_fixture(sweep());
        record.measurements.push(MeasurementPoint::new(1.0, 0.0, -70.0));
        store_sample_data(&record, &data).unwrap();

        let mut table = load_table(&data).unwrap();
        assert_eq!(table.headers, MEASUREMENT_COLUMNS);
        assert_eq!(table.len(), 4);

        let frame = derive_impedances(&table);
        assert_eq!(frame.rows.len(), 3);
        table.attach_impedance(&frame);
        let results = dir.path().join("eis_results.csv");
        store_table(&table, &results).unwrap();

        let reloaded = load_table(&results).unwrap();
        assert_eq!(reloaded.headers.len(), MEASUREMENT_COLUMNS.len() + 2);
        assert_eq!(reloaded.rows[3].cells[13], "");
        assert_eq!(reloaded.rows[3].cells[0], "S-001");
        let real: f64 = reloaded.rows[0].cells[13].parse().unwrap();
        assert!((real - frame.rows[0].impedance.real).abs() < 1e-9);
    }
}
