// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::info;

use crate::stats::Summary;
use crate::types::{Result, TendencyError};

/// Pixel size of saved images
pub const PLOT_SIZE: (u32, u32) = (1280, 760);

const LINE_WIDTH: u32 = 2;
const DASH_SIZE: u32 = 8;
const DASH_SPACING: u32 = 6;

/// One histogram bar. `end` is exclusive except for the last bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning the smallest to the largest sample
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<Bin>,
}

impl Histogram {
    pub fn from_samples(samples: &[f64], bins: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(TendencyError::EmptySample);
        }
        if bins == 0 {
            return Err(TendencyError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let (mut lo, mut hi) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &sample in samples {
            let idx = (((sample - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                start: lo + i as f64 * width,
                end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
                count,
            })
            .collect();

        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// (first bin start, last bin end)
    pub fn range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Quartile,
    Fence,
    Mean,
    Sigma,
}

impl LineKind {
    /// Quartiles and fences share the first line style, mean and sigma
    /// bands the second.
    pub fn is_quartile_group(&self) -> bool {
        matches!(self, LineKind::Quartile | LineKind::Fence)
    }
}

/// A vertical marker laid over the histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub value: f64,
    pub kind: LineKind,
}

/// Quartiles, fences, mean and the six sigma-band edges, in that order
pub fn reference_lines(summary: &Summary) -> Vec<ReferenceLine> {
    let line = |value, kind| ReferenceLine { value, kind };

    let mut lines = Vec::with_capacity(12);
    lines.extend(summary.quartiles().map(|v| line(v, LineKind::Quartile)));
    lines.extend(summary.fences().map(|v| line(v, LineKind::Fence)));
    lines.push(line(summary.mean, LineKind::Mean));
    for band in &summary.sigma_bands {
        lines.push(line(band.upper, LineKind::Sigma));
        lines.push(line(band.lower, LineKind::Sigma));
    }
    lines
}

/// Everything needed to draw the response time histogram, independent of
/// where it ends up (image file or terminal)
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub histogram: Histogram,
    pub lines: Vec<ReferenceLine>,
    /// Top of every reference line
    pub line_height: f64,
}

impl Figure {
    pub fn new(
        title: impl Into<String>,
        samples: &[f64],
        summary: &Summary,
        bins: usize,
        line_height: f64,
    ) -> Result<Self> {
        Ok(Self {
            title: title.into(),
            histogram: Histogram::from_samples(samples, bins)?,
            lines: reference_lines(summary),
            line_height,
        })
    }

    /// Horizontal extent covering every bar and every reference line
    pub fn x_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .lines
            .iter()
            .fold(self.histogram.range(), |(lo, hi), l| {
                (lo.min(l.value), hi.max(l.value))
            });
        let pad = (hi - lo) * 0.02;
        (lo - pad, hi + pad)
    }

    pub fn y_top(&self) -> f64 {
        self.line_height.max(self.histogram.max_count() as f64) * 1.05
    }
}

/// Draw the histogram with its reference lines onto any plotters backend
pub fn draw_histogram<'a, T>(
    backend: T,
    figure: &Figure,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'a>>
where
    T: 'a + DrawingBackend,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = figure.x_range();
    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .margin(15)
        .caption(&figure.title, ("sans-serif", 24))
        .build_cartesian_2d(x_lo..x_hi, 0.0..figure.y_top())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Response time (days)")
        .y_desc("Complaints")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    chart.draw_series(figure.histogram.bins().iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], GREEN.filled())
    }))?;

    for line in &figure.lines {
        let color = if line.kind.is_quartile_group() { BLACK } else { RED };
        chart.draw_series(DashedLineSeries::new(
            vec![(line.value, 0.0), (line.value, figure.line_height)],
            DASH_SIZE,
            DASH_SPACING,
            color.stroke_width(LINE_WIDTH),
        ))?;
    }

    // To avoid the IO failure being ignored silently, we manually call the present function
    root.present()?;

    Ok(())
}

/// Write the figure to `path` as SVG. Bitmap output would need a font
/// backend for the labels, so any other extension is rejected.
pub fn save_plot(path: &Path, figure: &Figure) -> Result<()> {
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if !is_svg {
        return Err(TendencyError::Plot(format!(
            "{}: only .svg output is supported",
            path.display()
        )));
    }

    draw_histogram(SVGBackend::new(path, PLOT_SIZE), figure)
        .map_err(|e| TendencyError::Plot(format!("{}: {}", path.display(), e)))?;

    info!("Saved histogram to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;
    use crate::types::FenceMode;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    fn figure() -> Figure {
        let samples = one_to_ten();
        let summary = summarize(&samples, FenceMode::UpperQuartile).unwrap();
        Figure::new("Plumbing response times", &samples, &summary, 50, 900.0).unwrap()
    }

    #[test]
    fn bins_cover_min_to_max() {
        let hist = Histogram::from_samples(&one_to_ten(), 9).unwrap();
        assert_eq!(hist.bins().len(), 9);
        assert_eq!(hist.range(), (1.0, 10.0));
        assert_eq!(hist.total(), 10);
        // 9 and 10 both land in the last, closed bin
        assert_eq!(hist.bins()[8].count, 2);
        assert!(hist.bins()[..8].iter().all(|b| b.count == 1));
    }

    #[test]
    fn identical_samples_get_a_unit_range() {
        let hist = Histogram::from_samples(&[3.0, 3.0, 3.0], 4).unwrap();
        assert_eq!(hist.range(), (2.5, 3.5));
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn histogram_rejects_bad_input() {
        assert!(matches!(
            Histogram::from_samples(&[], 50),
            Err(TendencyError::EmptySample)
        ));
        assert!(matches!(
            Histogram::from_samples(&[1.0], 0),
            Err(TendencyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn twelve_reference_lines_in_two_groups() {
        let lines = figure().lines;
        assert_eq!(lines.len(), 12);
        assert_eq!(lines.iter().filter(|l| l.kind.is_quartile_group()).count(), 5);
        assert_eq!(
            lines[0],
            ReferenceLine {
                value: 3.25,
                kind: LineKind::Quartile,
            }
        );
        assert_eq!(
            lines[5],
            ReferenceLine {
                value: 5.5,
                kind: LineKind::Mean,
            }
        );
        assert!(lines[6..].iter().all(|l| l.kind == LineKind::Sigma));
    }

    #[test]
    fn axes_include_lines_beyond_the_data() {
        let fig = figure();
        let (lo, hi) = fig.x_range();
        // third sigma band reaches below 1 and above 10
        assert!(lo < -3.0);
        assert!(hi > 14.0);
        assert!(fig.y_top() >= 900.0);
    }

    #[test]
    fn svg_contains_bars_and_both_line_colors() {
        let fig = figure();
        let mut svg = String::new();
        draw_histogram(SVGBackend::with_string(&mut svg, (800, 600)), &fig).unwrap();
        let svg = svg.to_uppercase();

        assert!(svg.contains("<RECT"));
        assert!(svg.contains("#00FF00"), "green bars");
        assert!(svg.contains("#FF0000"), "red mean lines");
        assert!(svg.contains("#000000"), "black quartile lines");
    }

    #[test]
    fn save_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.svg");
        save_plot(&path, &figure()).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn save_rejects_bitmap_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let fig = figure();

        for name in ["hist.png", "hist.bmp", "hist"] {
            let path = dir.path().join(name);
            let err = save_plot(&path, &fig).unwrap_err();
            assert!(matches!(err, TendencyError::Plot(_)));
            assert!(err.to_string().contains(name));
            assert!(!path.exists());
        }
    }
}
