use crate::drivers::dataset::ImpedanceRow;

/// Ready-to-plot series for the two EIS views, in dataset order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImpedanceSpectrum {
    /// (frequency Hz, real Z Ω), drawn log-log.
    pub bode_magnitude: Vec<(f64, f64)>,
    /// (frequency Hz, phase °), drawn log-x.
    pub bode_phase: Vec<(f64, f64)>,
    /// (real Z Ω, imag Z Ω).
    pub nyquist: Vec<(f64, f64)>,
}

impl ImpedanceSpectrum {
    pub fn from_rows(rows: &[ImpedanceRow]) -> Self {
        Self {
            bode_magnitude: bode_magnitude(rows),
            bode_phase: bode_phase(rows),
            nyquist: nyquist(rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nyquist.is_empty()
    }
}

// Order is never changed here: unsorted or repeated frequencies are drawn as given.

pub fn bode_magnitude(rows: &[ImpedanceRow]) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|r| (r.frequency, r.impedance.real))
        .collect()
}

pub fn bode_phase(rows: &[ImpedanceRow]) -> Vec<(f64, f64)> {
    rows.iter().map(|r| (r.frequency, r.phase_angle)).collect()
}

pub fn nyquist(rows: &[ImpedanceRow]) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|r| (r.impedance.real, r.impedance.imag))
        .collect()
}
