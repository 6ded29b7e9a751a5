use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::warn;
use plotters::coord::Shift;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use serde::Deserialize;
use crate::drivers::error::EisError;
use crate::drivers::spectrum::ImpedanceSpectrum;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub palette: Vec<RGBColor>,
    /// Captions, tick labels and axis titles. Needs a system font.
    pub annotate: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            background: WHITE,
            foreground: BLACK,
            palette: vec![BLUE, RED, GREEN, MAGENTA, CYAN],
            annotate: true,
        }
    }
}
/// `[plot]` table of the config file. Colors are `[r, g, b]`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotStyleConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background: Option<[u8; 3]>,
    pub foreground: Option<[u8; 3]>,
    pub palette: Option<Vec<[u8; 3]>>,
    pub annotate: Option<bool>,
}
/// Largest accepted width or height, in pixels.
pub const MAX_PLOT_SIDE: u32 = 16_384;
impl PlotStyle {
    pub fn from_config(cfg: &PlotStyleConfig) -> Result<Self, EisError> {
        let base = PlotStyle::default();
        let rgb = |c: [u8; 3]| RGBColor(c[0], c[1], c[2]);
        let style = Self {
            width: cfg.width.unwrap_or(base.width),
            height: cfg.height.unwrap_or(base.height),
            background: cfg.background.map(rgb).unwrap_or(base.background),
            foreground: cfg.foreground.map(rgb).unwrap_or(base.foreground),
            palette: match &cfg.palette {
                Some(colors) => colors.iter().copied().map(rgb).collect(),
                None => base.palette,
            },
            annotate: cfg.annotate.unwrap_or(base.annotate),
        };
        if style.width == 0 || style.height == 0 {
            return Err(EisError::Config("plot width and height must be non-zero".into()));
        }
        if style.width > MAX_PLOT_SIDE || style.height > MAX_PLOT_SIDE {
            return Err(EisError::Config(format!(
                "plot width and height must not exceed {MAX_PLOT_SIDE} pixels"
            )));
        }
        if style.palette.is_empty() {
            return Err(EisError::Config("plot palette must not be empty".into()));
        }
        Ok(style)
    }
    /// RGB byte count of one frame.
    fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
    fn color(&self, idx: usize) -> RGBColor {
        self.palette[idx % self.palette.len()]
    }
}
/// Bode plot: |Z| against frequency on log-log axes above the phase against
/// log frequency. Points that cannot sit on a log axis are dropped.
pub fn render_bode_png(
    spectrum: &ImpedanceSpectrum,
    style: &PlotStyle,
) -> Result<Vec<u8>, EisError> {
    if spectrum.bode_magnitude.is_empty() {
        return Err(EisError::Plot("no impedance rows to plot".into()));
    }
    let magnitude = log_points(&spectrum.bode_magnitude, true, "Bode magnitude");
    let phase = log_points(&spectrum.bode_phase, false, "Bode phase");
    let mut buffer = vec![0u8; style.buffer_len()];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((2, 1));
        let (upper, lower) = (&panels[0], &panels[1]);
        let (f_lo, f_hi) = log_bounds(
            magnitude
                .iter()
                .chain(phase.iter())
                .map(|p| p.0),
        );
        let (m_lo, m_hi) = log_bounds(magnitude.iter().map(|p| p.1));
        let mut chart = chart_builder(upper, style, "Bode Plot")
            .build_cartesian_2d((f_lo..f_hi).log_scale(), (m_lo..m_hi).log_scale())?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&style.foreground.mix(0.1));
        if style.annotate {
            mesh.x_desc("Frequency (Hz)").y_desc("Impedance (Ohm)");
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        let color = style.color(0);
        chart.draw_series(LineSeries::new(magnitude.iter().copied(), &color))?;
        let (p_lo, p_hi) = linear_bounds(phase.iter().map(|p| p.1));
        let mut chart = chart_builder(lower, style, "")
            .build_cartesian_2d((f_lo..f_hi).log_scale(), p_lo..p_hi)?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&style.foreground.mix(0.1));
        if style.annotate {
            mesh.x_desc("Frequency (Hz)").y_desc("Phase Angle (degrees)");
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        let color = style.color(1);
        chart.draw_series(LineSeries::new(phase.iter().copied(), &color))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Nyquist plot: imaginary against real impedance, connected in dataset order
/// with a marker on every point.
pub fn render_nyquist_png(
    spectrum: &ImpedanceSpectrum,
    style: &PlotStyle,
) -> Result<Vec<u8>, EisError> {
    let points: Vec<(f64, f64)> = spectrum
        .nyquist
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if points.is_empty() {
        return Err(EisError::Plot("no impedance rows to plot".into()));
    }
    let mut buffer = vec![0u8; style.buffer_len()];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (x_lo, x_hi) = linear_bounds(points.iter().map(|p| p.0));
        let (y_lo, y_hi) = linear_bounds(points.iter().map(|p| p.1));
        let mut chart = chart_builder(&root, style, "Nyquist Plot")
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&style.foreground.mix(0.1));
        if style.annotate {
            mesh.x_desc("Real Impedance (Ohm)").y_desc("Imaginary Impedance (Ohm)");
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        let color = style.color(0);
        chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn chart_builder<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    style: &PlotStyle,
    title: &str,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45);
    if style.annotate && !title.is_empty() {
        builder.caption(title, ("sans-serif", 20).into_font().color(&style.foreground));
    }
    builder
}
/// Keeps finite points with positive x (and positive y when `log_y`).
fn log_points(points: &[(f64, f64)], log_y: bool, curve: &str) -> Vec<(f64, f64)> {
    let kept: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|&(x, y)| x.is_finite() && y.is_finite() && x > 0.0 && (!log_y || y > 0.0))
        .collect();
    let dropped = points.len() - kept.len();
    if dropped > 0 {
        warn!("{curve}: dropped {dropped} point(s) that cannot be drawn on a log axis");
    }
    kept
}
fn log_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (1.0, 10.0)
    } else {
        // factor-of-two headroom on both ends
        (lo / 2.0, hi * 2.0)
    }
}
fn linear_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (-1.0, 1.0)
    } else if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EisError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| EisError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::dataset::{derive_impedances, table_fixture};
    fn plain_style() -> PlotStyle {
        PlotStyle {
            width: 320,
            height: 240,
            annotate: false,
            ..PlotStyle::default()
        }
    }
    fn spectrum() -> ImpedanceSpectrum {
        let table = table_fixture(&[
            (1000.0, 0.25, 1e-4, -10.0),
            (100.0, 0.25, 8e-5, -35.0),
            (10.0, 0.25, 5e-5, -60.0),
            (1.0, 0.25, 4e-5, -75.0),
        ]);
        ImpedanceSpectrum::from_rows(&derive_impedances(&table).rows)
    }
    #[test]
    fn plotting_helpers_return_png() {
        let spectrum = spectrum();
        let bode = render_bode_png(&spectrum, &plain_style()).unwrap();
        let nyquist = render_nyquist_png(&spectrum, &plain_style()).unwrap();
        assert!(bode.starts_with(b"\x89PNG"));
        assert!(nyquist.starts_with(b"\x89PNG"));
    }
    #[test]
    fn empty_spectrum_is_rejected() {
        let empty = ImpedanceSpectrum::default();
        assert!(matches!(
            render_bode_png(&empty, &plain_style()),
            Err(EisError::Plot(_))
        ));
        assert!(matches!(
            render_nyquist_png(&empty, &plain_style()),
            Err(EisError::Plot(_))
        ));
    }
    #[test]
    fn bode_survives_negative_real_part() {
        let table = table_fixture(&[(10.0, 1.0, 1.0, 120.0), (1.0, 1.0, 1.0, 150.0)]);
        let spectrum = ImpedanceSpectrum::from_rows(&derive_impedances(&table).rows);
        assert!(render_bode_png(&spectrum, &plain_style()).is_ok());
    }
    #[test]
    fn log_points_drop_non_positive_values() {
        let kept = log_points(&[(0.0, 1.0), (1.0, -2.0), (2.0, 3.0)], true, "test");
        assert_eq!(kept, vec![(2.0, 3.0)]);
    }
    #[test]
    fn style_from_config_overrides_defaults() {
        let cfg = PlotStyleConfig {
            width: Some(400),
            palette: Some(vec![[1, 2, 3]]),
            ..Default::default()
        };
        let style = PlotStyle::from_config(&cfg).unwrap();
        assert_eq!(style.width, 400);
        assert_eq!(style.height, PlotStyle::default().height);
        let palette: Vec<(u8, u8, u8)> = style.palette.iter().map(|c| (c.0, c.1, c.2)).collect();
        assert_eq!(palette, vec![(1, 2, 3)]);
        let bad = PlotStyleConfig {
            palette: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(PlotStyle::from_config(&bad), Err(EisError::Config(_))));
    }
    #[test]
    fn oversized_plot_is_rejected() {
        let cfg = PlotStyleConfig {
            width: Some(40_000),
            height: Some(40_000),
            ..Default::default()
        };
        assert!(matches!(PlotStyle::from_config(&cfg), Err(EisError::Config(_))));
        let wide = PlotStyle {
            width: u32::MAX,
            height: 2,
            ..PlotStyle::default()
        };
        assert_eq!(wide.buffer_len(), u32::MAX as usize * 6);
    }
}
