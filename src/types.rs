// src/types.rs
use serde::{Deserialize, Serialize};

/// 电解池与电极参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSpecs {
    pub electrode_material: String,
    /// cm^2
    pub electrode_area: f64,
    /// mL
    pub cell_volume: f64,
}

/// One point of a frequency sweep. Never mutated after it is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub frequency: f64,
    pub recorded_current: f64,
    pub phase_angle: f64,
}

impl MeasurementPoint {
    pub fn new(frequency: f64, recorded_current: f64, phase_angle: f64) -> Self {
        Self {
            frequency,
            recorded_current,
            phase_angle,
        }
    }
}

/// 一个样本：元数据 + 多个频率点
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub sample_id: String,
    pub analyte: String,
    pub electrolyte: String,
    pub cell_specs: CellSpecs,
    pub applied_potential: f64,
    pub temperature: f64,
    pub reference_potential: f64,
    pub timestamp: String,
    pub measurements: Vec<MeasurementPoint>,
}

impl SampleRecord {
    /// Flattens the record into one row per measurement, repeating the
    /// sample-level fields on every row.
    pub fn to_rows(&self) -> Vec<MeasurementRow> {
        self.measurements
            .iter()
            .map(|m| MeasurementRow {
                sample_id: self.sample_id.clone(),
                analyte: self.analyte.clone(),
                electrolyte: self.electrolyte.clone(),
                electrode_material: self.cell_specs.electrode_material.clone(),
                electrode_area: self.cell_specs.electrode_area,
                cell_volume: self.cell_specs.cell_volume,
                applied_potential: self.applied_potential,
                temperature: self.temperature,
                reference_potential: self.reference_potential,
                frequency: m.frequency,
                recorded_current: m.recorded_current,
                phase_angle: m.phase_angle,
                timestamp: self.timestamp.clone(),
            })
            .collect()
    }

    /// Rebuilds records from flattened rows. Consecutive rows that agree on
    /// every sample-level field belong to the same record.
    pub fn group_rows(rows: impl IntoIterator<Item = MeasurementRow>) -> Vec<SampleRecord> {
        let mut records: Vec<SampleRecord> = Vec::new();
        for row in rows {
            let point = row.measurement();
            // 与上一行样本字段完全一致才归入同一样本
            if let Some(current) = records.last_mut().filter(|r| row.same_sample_as(r)) {
                current.measurements.push(point);
            } else {
                let mut record = row.sample_header();
                record.measurements.push(point);
                records.push(record);
            }
        }
        records
    }
}

/// Flattened (sample, measurement) pair; field order is the CSV column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub sample_id: String,
    pub analyte: String,
    pub electrolyte: String,
    pub electrode_material: String,
    pub electrode_area: f64,
    pub cell_volume: f64,
    pub applied_potential: f64,
    pub temperature: f64,
    pub reference_potential: f64,
    pub frequency: f64,
    pub recorded_current: f64,
    pub phase_angle: f64,
    pub timestamp: String,
}

impl MeasurementRow {
    pub fn measurement(&self) -> MeasurementPoint {
        MeasurementPoint::new(self.frequency, self.recorded_current, self.phase_angle)
    }

    /// Record with this row's sample-level fields and no measurements.
    fn sample_header(&self) -> SampleRecord {
        SampleRecord {
            sample_id: self.sample_id.clone(),
            analyte: self.analyte.clone(),
            electrolyte: self.electrolyte.clone(),
            cell_specs: CellSpecs {
                electrode_material: self.electrode_material.clone(),
                electrode_area: self.electrode_area,
                cell_volume: self.cell_volume,
            },
            applied_potential: self.applied_potential,
            temperature: self.temperature,
            reference_potential: self.reference_potential,
            timestamp: self.timestamp.clone(),
            measurements: Vec::new(),
        }
    }

    fn same_sample_as(&self, record: &SampleRecord) -> bool {
        self.sample_id == record.sample_id
            && self.analyte == record.analyte
            && self.electrolyte == record.electrolyte
            && self.electrode_material == record.cell_specs.electrode_material
            && self.electrode_area == record.cell_specs.electrode_area
            && self.cell_volume == record.cell_specs.cell_volume
            && self.applied_potential == record.applied_potential
            && self.temperature == record.temperature
            && self.reference_potential == record.reference_potential
            && self.timestamp == record.timestamp
    }
}

/// Column order of the append-path CSV file.
pub const MEASUREMENT_COLUMNS: [&str; 13] = [
    "sample_id",
    "analyte",
    "electrolyte",
    "electrode_material",
    "electrode_area",
    "cell_volume",
    "applied_potential",
    "temperature",
    "reference_potential",
    "frequency",
    "recorded_current",
    "phase_angle",
    "timestamp",
];

#[cfg(test)]
pub(crate) fn sample_fixture(measurements: Vec<MeasurementPoint>) -> SampleRecord {
    SampleRecord {
        sample_id: "S-001".into(),
        analyte: "IgG".into(),
        electrolyte: "PBS, pH 7.4".into(),
        cell_specs: CellSpecs {
            electrode_material: "Au".into(),
            electrode_area: 0.0314,
            cell_volume: 5.0,
        },
        applied_potential: 0.25,
        temperature: 22.5,
        reference_potential: 0.197,
        timestamp: "2024-07-15 10:30:00".into(),
        measurements,
    }
}
