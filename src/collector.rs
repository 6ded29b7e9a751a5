// src/collector.rs
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use log::debug;

use crate::drivers::EisError;
use crate::types::{CellSpecs, MeasurementPoint, SampleRecord};

/// Something that answers prompts, one line at a time.
pub trait InputProvider {
    /// Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, EisError>;
}

/// Interactive terminal input: prompt on `out`, answer from `input`.
pub struct ConsoleInput<R, W> {
    input: R,
    out: W,
}

impl ConsoleInput<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }
}

impl<R: BufRead, W: Write> InputProvider for ConsoleInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, EisError> {
        let console = |e| EisError::file_access("<console>", e);
        write!(self.out, "{prompt}").map_err(console)?;
        self.out.flush().map_err(console)?;
        let mut line = String::new();
        if self.input.read_line(&mut line).map_err(console)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Replays canned answers; useful for tests and piped sessions.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, EisError> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PromptField {
    pub name: &'static str,
    pub prompt: &'static str,
    pub numeric: bool,
}

const fn text(name: &'static str, prompt: &'static str) -> PromptField {
    PromptField { name, prompt, numeric: false }
}

const fn number(name: &'static str, prompt: &'static str) -> PromptField {
    PromptField { name, prompt, numeric: true }
}

/// Sample-level questions, asked once per session in this order.
pub const SAMPLE_FIELDS: [PromptField; 10] = [
    text("sample_id", "Enter sample ID: "),
    text("analyte", "Enter analyte: "),
    text("electrolyte", "Enter electrolyte: "),
    text("electrode_material", "Enter electrode material: "),
    number("electrode_area", "Enter electrode area (cm^2): "),
    number("cell_volume", "Enter cell volume (mL): "),
    number("applied_potential", "Enter applied potential (V): "),
    number("temperature", "Enter temperature (°C): "),
    number("reference_potential", "Enter reference electrode potential (V): "),
    text("timestamp", "Enter timestamp (YYYY-MM-DD HH:MM:SS): "),
];

/// Per-measurement questions, asked once per loop pass.
pub const MEASUREMENT_FIELDS: [PromptField; 3] = [
    number("frequency", "Enter frequency (Hz): "),
    number("recorded_current", "Enter recorded current (A): "),
    number("phase_angle", "Enter phase angle (degrees): "),
];

pub const CONTINUE_PROMPT: &str = "Add another measurement? (y/n): ";

pub fn parse_number(field: &str, raw: &str) -> Result<f64, EisError> {
    raw.trim().parse::<f64>().map_err(|_| EisError::InputParse {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Builds a record from the sample-level answers (in [`SAMPLE_FIELDS`]
/// order) and an already parsed sweep. Performs no I/O.
pub fn build_sample_record<S: AsRef<str>>(
    answers: &[S],
    measurements: Vec<MeasurementPoint>,
) -> Result<SampleRecord, EisError> {
    let [sample_id, analyte, electrolyte, electrode_material, electrode_area, cell_volume, applied_potential, temperature, reference_potential, timestamp] =
        answers
    else {
        return Err(EisError::InputParse {
            field: "sample fields".into(),
            value: format!("expected {} answers, got {}", SAMPLE_FIELDS.len(), answers.len()),
        });
    };
    Ok(SampleRecord {
        sample_id: sample_id.as_ref().to_string(),
        analyte: analyte.as_ref().to_string(),
        electrolyte: electrolyte.as_ref().to_string(),
        cell_specs: CellSpecs {
            electrode_material: electrode_material.as_ref().to_string(),
            electrode_area: parse_number("electrode_area", electrode_area.as_ref())?,
            cell_volume: parse_number("cell_volume", cell_volume.as_ref())?,
        },
        applied_potential: parse_number("applied_potential", applied_potential.as_ref())?,
        temperature: parse_number("temperature", temperature.as_ref())?,
        reference_potential: parse_number("reference_potential", reference_potential.as_ref())?,
        timestamp: timestamp.as_ref().to_string(),
        measurements,
    })
}

fn ask<P: InputProvider>(input: &mut P, field: &PromptField) -> Result<String, EisError> {
    let answer = input
        .read_line(field.prompt)?
        .ok_or_else(|| EisError::InputParse {
            field: field.name.to_string(),
            value: "<eof>".to_string(),
        })?;
    if field.numeric {
        // 数字字段当场校验，错误立刻终止会话
        parse_number(field.name, &answer)?;
    }
    Ok(answer)
}

/// Runs one collection session: the sample fields once, then measurements
/// until the operator answers anything but `y` to "add another".
///
/// At least one measurement is always taken before the first "add another"
/// question, so a completed session never yields an empty sweep.
pub fn collect_sample_data<P: InputProvider>(input: &mut P) -> Result<SampleRecord, EisError> {
    let answers = SAMPLE_FIELDS
        .iter()
        .map(|field| ask(input, field))
        .collect::<Result<Vec<_>, _>>()?;

    let mut measurements = Vec::new();
    loop {
        let mut values = [0.0f64; 3];
        for (slot, field) in values.iter_mut().zip(&MEASUREMENT_FIELDS) {
            *slot = parse_number(field.name, &ask(input, field)?)?;
        }
        let [frequency, recorded_current, phase_angle] = values;
        measurements.push(MeasurementPoint::new(frequency, recorded_current, phase_angle));
        debug!("measurement #{} recorded at {frequency} Hz", measurements.len());

        let more = input
            .read_line(CONTINUE_PROMPT)?
            .is_some_and(|a| a.trim().eq_ignore_ascii_case("y"));
        if !more {
            break;
        }
    }
    build_sample_record(&answers, measurements)
}
