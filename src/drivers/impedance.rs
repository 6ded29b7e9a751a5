//! Impedance of one EIS measurement point.
//!
//! The instrument reports the phase angle separately from the current, so the
//! impedance is resolved from two independent inputs:
//! - `|Z| = applied_potential / recorded_current` (a plain ratio, sign kept).
//! - `real = |Z| * cos(phase)`, `imag = |Z| * sin(phase)`, phase in degrees.
//!
//! Phase angles are used as given. Values outside [-360, 360] are accepted
//! without wrapping.
use num_complex::Complex64;

use crate::drivers::error::EisError;

/// Rectangular impedance in ohms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impedance {
    pub real: f64,
    pub imag: f64,
}

impl Impedance {
    pub fn magnitude(&self) -> f64 {
        self.as_complex().norm()
    }

    pub fn as_complex(&self) -> Complex64 {
        Complex64::new(self.real, self.imag)
    }
}

/// Resolve (V, I, phase°) into rectangular impedance.
///
/// A zero current (either sign), or one so small that the ratio overflows,
/// has no defined impedance and returns [`EisError::Division`] instead of an
/// infinite value. The error carries no
/// row index; callers working on tables attach one with [`EisError::at_row`].
pub fn compute_impedance(
    applied_potential: f64,
    recorded_current: f64,
    phase_angle_deg: f64,
) -> Result<Impedance, EisError> {
    if recorded_current == 0.0 {
        return Err(EisError::Division { row: None });
    }
    let ratio = applied_potential / recorded_current;
    if !ratio.is_finite() {
        return Err(EisError::Division { row: None });
    }
    let z = Complex64::from_polar(ratio, phase_angle_deg.to_radians());
    Ok(Impedance {
        real: z.re,
        imag: z.im,
    })
}
