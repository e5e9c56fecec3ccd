//! Pearson correlation between numeric columns

use serde::Serialize;

use crate::data::model::Dataset;
use crate::error::{AnalysisError, Result};

/// Pearson correlation over the rows where both cells are present.
///
/// Returns `None` when fewer than two pairs remain or either side is
/// constant, since the coefficient is undefined there.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2
        || is_constant(pairs.iter().map(|p| p.0))
        || is_constant(pairs.iter().map(|p| p.1))
    {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    // Deviations are scaled to at most 1 so their squares cannot overflow
    // or underflow; the coefficient does not depend on the scale.
    let scale_x = max_abs_deviation(pairs.iter().map(|p| p.0), mean_x)?;
    let scale_y = max_abs_deviation(pairs.iter().map(|p| p.1), mean_y)?;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = (a - mean_x) / scale_x;
        let dy = (b - mean_y) / scale_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let denom = sxx.sqrt() * syy.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

fn max_abs_deviation(values: impl Iterator<Item = f64>, mean: f64) -> Option<f64> {
    let m = values.map(|v| (v - mean).abs()).fold(0.0, f64::max);
    (m > 0.0 && m.is_finite()).then_some(m)
}

pub(crate) fn is_constant(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

/// A pair of columns and their correlation coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub col_a: String,
    pub col_b: String,
    pub r: f64,
}

/// Symmetric correlation matrix over the numeric columns of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    /// Row-major, `None` where the coefficient is undefined
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }

    pub fn value_at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied().flatten()
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.value_at(self.index_of(a)?, self.index_of(b)?)
    }

    /// Correlations of `column` with every other column, strongest positive
    /// first and undefined coefficients last.
    pub fn ranked_against(&self, column: &str) -> Result<Vec<(String, Option<f64>)>> {
        let i = self
            .index_of(column)
            .ok_or_else(|| AnalysisError::ColumnNotFound(column.to_string()))?;

        let mut ranked: Vec<(String, Option<f64>)> = self
            .names
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, name)| (name.clone(), self.value_at(i, j)))
            .collect();

        ranked.sort_by(|a, b| match (a.1, b.1) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(ranked)
    }

    /// The `n` distinct column pairs with the largest |r|.
    pub fn strongest_pairs(&self, n: usize) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                if let Some(r) = self.value_at(i, j) {
                    pairs.push(CorrelationPair {
                        col_a: self.names[i].clone(),
                        col_b: self.names[j].clone(),
                        r,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs.truncate(n);
        pairs
    }
}

/// Compute the pairwise-complete Pearson matrix of all numeric columns.
pub fn compute_correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix> {
    let columns: Vec<(&str, &[Option<f64>])> = dataset
        .numeric_columns()
        .filter_map(|c| Some((c.name(), c.as_numeric()?)))
        .collect();

    if columns.is_empty() {
        return Err(AnalysisError::EmptyDataset("no numeric columns".into()));
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        // A column correlates perfectly with itself whenever its variance is defined.
        values[i][i] = pearson(columns[i].1, columns[i].1).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(columns[i].1, columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    log::debug!("Computed {n}x{n} correlation matrix over {} rows", dataset.row_count());

    Ok(CorrelationMatrix {
        names: columns.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}
