//! Ordinary least-squares trend line between two numeric columns

use serde::Serialize;

use super::correlation::{is_constant, pearson};
use crate::data::model::Dataset;
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFit {
    pub x_column: String,
    pub y_column: String,
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Pearson r of the paired values, undefined for a constant y
    pub r: Option<f64>,
    /// Paired observations used in the fit
    pub n: usize,
}

impl TrendFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Rows where both columns are present, as (x, y).
pub(crate) fn paired_values(dataset: &Dataset, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xs = dataset.numeric_column(x)?;
    let ys = dataset.numeric_column(y)?;
    Ok(xs
        .iter()
        .zip(ys)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect())
}

/// Fit `y = slope * x + intercept` after dropping rows missing either value.
pub fn fit_linear_trend(dataset: &Dataset, x: &str, y: &str) -> Result<TrendFit> {
    if x == y {
        return Err(AnalysisError::InsufficientData(format!(
            "x and y both name column '{x}'"
        )));
    }

    let pairs = paired_values(dataset, x, y)?;
    let n = pairs.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "need at least 2 paired rows of '{x}' and '{y}', got {n}"
        )));
    }
    if is_constant(pairs.iter().map(|p| p.0)) {
        return Err(AnalysisError::InsufficientData(format!(
            "column '{x}' has zero variance"
        )));
    }

    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    if !(sxx.is_finite() && sxx > 0.0) {
        return Err(AnalysisError::InsufficientData(format!(
            "variance of column '{x}' is out of floating-point range"
        )));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = pairs
        .iter()
        .map(|p| (p.1 - (slope * p.0 + intercept)).powi(2))
        .sum();
    let ss_tot: f64 = pairs.iter().map(|p| (p.1 - mean_y).powi(2)).sum();

    // A constant y is fitted exactly by the horizontal line.
    let r_squared = if is_constant(pairs.iter().map(|p| p.1)) {
        1.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    if !(slope.is_finite() && intercept.is_finite() && r_squared.is_finite()) {
        return Err(AnalysisError::InsufficientData(format!(
            "trend of '{y}' on '{x}' is out of floating-point range"
        )));
    }

    let (xs, ys): (Vec<Option<f64>>, Vec<Option<f64>>) =
        pairs.iter().map(|&(a, b)| (Some(a), Some(b))).unzip();

    log::debug!("Fitted trend {y} ~ {x} on {n} rows: slope={slope}, intercept={intercept}");

    Ok(TrendFit {
        x_column: x.to_string(),
        y_column: y.to_string(),
        slope,
        intercept,
        r_squared,
        r: pearson(&xs, &ys),
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn linear() -> Dataset {
        let x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let y: Vec<Option<f64>> = (1..=10).map(|v| Some(2.0 * v as f64 + 1.0)).collect();
        Dataset::new(vec![Column::numeric("x", x), Column::numeric("y", y)]).unwrap()
    }

    #[test]
    fn test_perfect_line() {
        let fit = fit_linear_trend(&linear(), "x", "y").unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-10);
        assert!((fit.intercept - 1.0).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
        assert!((fit.r.unwrap() - 1.0).abs() < 1e-10);
        assert_eq!(fit.n, 10);
        assert!((fit.predict(20.0) - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_rows_are_dropped() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), None, Some(3.0), Some(4.0)]),
            Column::numeric("y", vec![Some(3.0), Some(50.0), None, Some(9.0)]),
        ])
        .unwrap();
        let fit = fit_linear_trend(&ds, "x", "y").unwrap();
        assert_eq!(fit.n, 2);
        assert!((fit.slope - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_too_few_pairs() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), None]),
            Column::numeric("y", vec![Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        assert!(matches!(
            fit_linear_trend(&ds, "x", "y"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_same_column_rejected() {
        assert!(matches!(
            fit_linear_trend(&linear(), "x", "x"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_x_rejected() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0); 3]),
            Column::numeric("y", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        assert!(matches!(
            fit_linear_trend(&ds, "x", "y"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_unrepresentable_variance_rejected() {
        for x in [[0.0, 1e-170, 2e-170], [0.0, 1e160, 2e160]] {
            let ds = Dataset::new(vec![
                Column::numeric("x", x.iter().copied().map(Some).collect()),
                Column::numeric("y", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ])
            .unwrap();
            assert!(matches!(
                fit_linear_trend(&ds, "x", "y"),
                Err(AnalysisError::InsufficientData(_))
            ));
        }
    }

    #[test]
    fn test_constant_y_is_flat_line() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(2.0), Some(3.0)]),
            Column::numeric("y", vec![Some(5.0); 3]),
        ])
        .unwrap();
        let fit = fit_linear_trend(&ds, "x", "y").unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 5.0);
        assert_eq!(fit.r_squared, 1.0);
        assert_eq!(fit.r, None);
    }

    #[test]
    fn test_unknown_and_categorical_columns() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(2.0)]),
            Column::categorical("cut", vec![Some("Ideal".into()), Some("Good".into())]),
        ])
        .unwrap();
        assert!(matches!(
            fit_linear_trend(&ds, "x", "price"),
            Err(AnalysisError::ColumnNotFound(_))
        ));
        assert!(matches!(
            fit_linear_trend(&ds, "x", "cut"),
            Err(AnalysisError::NotNumeric(_))
        ));
    }
}
