use log::{info, warn};
use crate::drivers::dataset::{derive_impedances, AnalysisTable, ImpedanceFrame};
use crate::drivers::detection::analyze_results;
use crate::drivers::error::EisError;
use crate::drivers::plot::{render_bode_png, render_nyquist_png, PlotStyle};
use crate::drivers::spectrum::ImpedanceSpectrum;
type RenderFn = fn(&ImpedanceSpectrum, &PlotStyle) -> Result<Vec<u8>, EisError>;
/// Everything the analyzer derives from one table.
#[derive(Debug)]
pub struct AnalysisOutput {
    pub frame: ImpedanceFrame,
    pub spectrum: ImpedanceSpectrum,
    /// `None` when no row has a defined impedance.
    pub bode_png: Option<Vec<u8>>,
    pub nyquist_png: Option<Vec<u8>>,
    pub detected: bool,
}
/// Table in, impedance columns + plots + detection out. No file I/O.
pub struct ImpedancePipeline {
    style: PlotStyle,
}
impl ImpedancePipeline {
    pub fn new(style: PlotStyle) -> Self {
        Self { style }
    }
    /// Derives impedance for every row, writes `real_Z` / `imag_Z` back into
    /// `table`, then renders both plots in dataset order.
    pub fn process(&self, table: &mut AnalysisTable) -> Result<AnalysisOutput, EisError> {
        let frame = derive_impedances(table);
        table.attach_impedance(&frame);
        info!(
            "derived impedance for {}/{} rows",
            frame.rows.len(),
            frame.total_rows()
        );
        let spectrum = ImpedanceSpectrum::from_rows(&frame.rows);
        let (bode_png, nyquist_png) = if spectrum.is_empty() {
            warn!("no row has a defined impedance, skipping plots");
            (None, None)
        } else {
            (
                Some(self.render("Bode", &spectrum, render_bode_png)?),
                Some(self.render("Nyquist", &spectrum, render_nyquist_png)?),
            )
        };
        let detected = analyze_results(&frame);
        Ok(AnalysisOutput {
            frame,
            spectrum,
            bode_png,
            nyquist_png,
            detected,
        })
    }
    // Text needs a system font; fall back to an unlabelled chart without one.
    fn render(
        &self,
        name: &str,
        spectrum: &ImpedanceSpectrum,
        render: RenderFn,
    ) -> Result<Vec<u8>, EisError> {
        match render(spectrum, &self.style) {
            Err(err) if self.style.annotate => {
                warn!("{name} plot: {err}; retrying without labels");
                let plain = PlotStyle {
                    annotate: false,
                    ..self.style.clone()
                };
                render(spectrum, &plain)
            }
            result => result,
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::dataset::table_fixture;
    fn pipeline() -> ImpedancePipeline {
        ImpedancePipeline::new(PlotStyle {
            width: 320,
            height: 240,
            annotate: false,
            ..PlotStyle::default()
        })
    }
    #[test]
    fn pipeline_derives_and_plots() {
        let mut table = table_fixture(&[
            (100.0, 5.0, 0.5, -20.0),
            (10.0, 5.0, 0.0, -40.0),
            (1000.0, 5.0, 0.25, -5.0),
        ]);
        let output = pipeline().process(&mut table).unwrap();
        assert_eq!(output.frame.rows.len(), 2);
        assert_eq!(output.frame.failures.len(), 1);
        assert_eq!(output.spectrum.bode_magnitude.len(), 2);
        assert_eq!(output.spectrum.bode_magnitude[1].0, 1000.0);
        assert!(output.bode_png.is_some_and(|png| !png.is_empty()));
        assert!(output.nyquist_png.is_some_and(|png| !png.is_empty()));
        assert!(output.detected);
        assert_eq!(table.headers.last().map(String::as_str), Some("imag_Z"));
    }
    #[test]
    fn all_failed_rows_skip_plots() {
        let mut table = table_fixture(&[(100.0, 5.0, 0.0, -20.0)]);
        let output = pipeline().process(&mut table).unwrap();
        assert!(output.bode_png.is_none());
        assert!(output.nyquist_png.is_none());
        assert!(output.detected);
    }
}
