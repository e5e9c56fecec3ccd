//! Series behind the scatter, line and histogram views

use serde::Serialize;

use super::trend::{fit_linear_trend, paired_values, TrendFit};
use crate::data::model::Dataset;
use crate::error::{AnalysisError, Result};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Scatter,
    Line,
    HistogramX,
    HistogramY,
}

impl PlotKind {
    /// Scatter and line plots need two distinct columns.
    pub fn is_two_variable(self) -> bool {
        matches!(self, PlotKind::Scatter | PlotKind::Line)
    }
}

/// Equal-width bins over the observed range of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// (lower edge, upper edge, count) per bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotData {
    Scatter {
        points: Vec<[f64; 2]>,
        trend: Option<TrendFit>,
    },
    Line {
        points: Vec<[f64; 2]>,
    },
    Histogram(Histogram),
}

/// Bin the non-missing values of a numeric column.
///
/// The last bin is closed on the right. A constant column is binned over
/// `[v - 0.5, v + 0.5]`.
pub fn histogram(dataset: &Dataset, column: &str, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(AnalysisError::InsufficientData(
            "histogram needs at least one bin".into(),
        ));
    }

    let values: Vec<f64> = dataset
        .numeric_column(column)?
        .iter()
        .flatten()
        .copied()
        .collect();
    if values.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "column '{column}' has no values"
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let mut edges: Vec<f64> = (0..bins).map(|i| lo + i as f64 * width).collect();
    edges.push(hi);

    Ok(Histogram {
        column: column.to_string(),
        edges,
        counts,
    })
}

/// Prepare the data for one plot of `y` against `x`.
pub fn prepare_plot(
    dataset: &Dataset,
    x: &str,
    y: &str,
    kind: PlotKind,
    bins: usize,
) -> Result<PlotData> {
    if kind.is_two_variable() && x == y {
        return Err(AnalysisError::InsufficientData(
            "choose different columns for x and y".into(),
        ));
    }

    match kind {
        PlotKind::Scatter => {
            let points = paired_values(dataset, x, y)?
                .into_iter()
                .map(|(a, b)| [a, b])
                .collect();
            let trend = match fit_linear_trend(dataset, x, y) {
                Ok(fit) => Some(fit),
                Err(e) => {
                    log::debug!("No trend line for {y} ~ {x}: {e}");
                    None
                }
            };
            Ok(PlotData::Scatter { points, trend })
        }
        PlotKind::Line => {
            let mut points: Vec<[f64; 2]> = paired_values(dataset, x, y)?
                .into_iter()
                .map(|(a, b)| [a, b])
                .collect();
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Ok(PlotData::Line { points })
        }
        PlotKind::HistogramX => Ok(PlotData::Histogram(histogram(dataset, x, bins)?)),
        PlotKind::HistogramY => Ok(PlotData::Histogram(histogram(dataset, y, bins)?)),
    }
}
