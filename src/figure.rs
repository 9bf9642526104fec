//! Figures - declarative plot descriptions
//!
//! A [`Figure`] records what to draw (series of points, labels, plot kind),
//! not how to rasterize it. Savers serialize figures as JSON; rendering is
//! left to downstream tooling.

use serde::{Deserialize, Serialize};

/// Number of evaluation points of a density estimate.
pub const DENSITY_GRID_POINTS: usize = 128;

/// Kind of plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    /// Line plot of y against x
    Line,
    /// Kernel density estimate curves
    Density,
}

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    label: String,
    points: Vec<(f64, f64)>,
    filled: bool,
}

impl Series {
    /// Create a series from `(x, y)` points.
    #[must_use]
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            filled: false,
        }
    }

    /// Fill the area under the curve.
    #[must_use]
    pub const fn filled(mut self) -> Self {
        self.filled = true;
        self
    }

    /// Get the legend label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the points.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Whether the area under the curve is filled.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.filled
    }
}

/// A plot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    kind: FigureKind,
    title: String,
    x_label: String,
    y_label: String,
    series: Vec<Series>,
    grid: bool,
    legend: bool,
}

impl Figure {
    /// Create an empty figure.
    #[must_use]
    pub fn new(
        kind: FigureKind,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            grid: false,
            legend: false,
        }
    }

    /// Line plot of `y` against `x`; pairs with a missing or non-finite side are dropped.
    #[must_use]
    pub fn line(x_label: &str, y_label: &str, x: &[Option<f64>], y: &[Option<f64>]) -> Self {
        let points = x
            .iter()
            .zip(y)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        let mut figure = Self::new(
            FigureKind::Line,
            format!("{y_label} vs {x_label}"),
            x_label,
            y_label,
        );
        figure.push_series(Series::new(y_label, points));
        figure.grid = true;
        figure.legend = true;
        figure
    }

    /// Density comparison of two samples evaluated on a shared grid.
    #[must_use]
    pub fn density_comparison(
        title: impl Into<String>,
        samples: &[(&str, &[f64])],
    ) -> Self {
        let mut figure = Self::new(FigureKind::Density, title, "Value", "Density");
        let pooled: Vec<f64> = samples
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .filter(|v| v.is_finite())
            .collect();

        if let Some(grid) = density_grid(&pooled, DENSITY_GRID_POINTS) {
            for (label, values) in samples {
                let curve = gaussian_kde(values, &grid);
                figure.push_series(Series::new(*label, curve).filled());
            }
        }
        figure.legend = true;
        figure
    }

    /// Append a series.
    pub fn push_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// Toggle the background grid.
    pub fn set_grid(&mut self, grid: bool) {
        self.grid = grid;
    }

    /// Replace the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Get the plot kind.
    #[must_use]
    pub const fn kind(&self) -> FigureKind {
        self.kind
    }

    /// Get the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the x axis label.
    #[must_use]
    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    /// Get the y axis label.
    #[must_use]
    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    /// Get the series.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Whether a background grid is drawn.
    #[must_use]
    pub const fn has_grid(&self) -> bool {
        self.grid
    }

    /// Whether a legend is drawn.
    #[must_use]
    pub const fn has_legend(&self) -> bool {
        self.legend
    }
}

/// Silverman's rule-of-thumb bandwidth.
#[allow(clippy::cast_precision_loss)]
fn silverman_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = 1.06 * variance.sqrt() * n.powf(-0.2);
    if bandwidth > 0.0 {
        bandwidth
    } else {
        // Constant sample
        1.0
    }
}

/// Evenly spaced grid covering the pooled sample plus three bandwidths.
#[allow(clippy::cast_precision_loss)]
fn density_grid(pooled: &[f64], points: usize) -> Option<Vec<f64>> {
    let min = pooled.iter().copied().reduce(f64::min)?;
    let max = pooled.iter().copied().reduce(f64::max)?;
    let pad = 3.0 * silverman_bandwidth(pooled);
    let (lo, hi) = (min - pad, max + pad);
    let step = (hi - lo) / (points - 1) as f64;
    Some((0..points).map(|i| lo + step * i as f64).collect())
}

/// Gaussian kernel density estimate of `values` at each grid point.
#[allow(clippy::cast_precision_loss)]
fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return grid.iter().map(|&x| (x, 0.0)).collect();
    }
    let h = silverman_bandwidth(&finite);
    let norm = 1.0 / (finite.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());

    grid.iter()
        .map(|&x| {
            let sum: f64 = finite
                .iter()
                .map(|v| {
                    let u = (x - v) / h;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}
