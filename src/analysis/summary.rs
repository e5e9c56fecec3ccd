//! Descriptive statistics per column
//!
//! Numeric columns get count, mean, sample standard deviation, min,
//! quartiles and max. Categorical columns get count, distinct count, the
//! most frequent value and its frequency. Anything undefined is `None`.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::data::model::{ColumnData, ColumnKind, Dataset};
use crate::error::{AnalysisError, Result};

/// Statistics for a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Number of non-missing values
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (N - 1 denominator)
    pub std: Option<f64>,
    pub min: Option<f64>,
    /// 25th percentile
    pub q25: Option<f64>,
    /// 50th percentile
    pub median: Option<f64>,
    /// 75th percentile
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    /// Compute statistics from the non-missing values of a column
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::empty();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[count - 1];

        let n = count as f64;
        let mut mean = values.iter().sum::<f64>() / n;
        if !mean.is_finite() {
            // the plain sum overflowed
            mean = values.iter().map(|x| x / n).sum();
        }
        // Rounding can push the mean of near-identical values just outside [min, max].
        let mean = mean.clamp(min, max);

        let std = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean: finite(mean),
            std: std.and_then(finite),
            min: finite(min),
            q25: quantile(&sorted, 0.25).and_then(finite),
            median: quantile(&sorted, 0.5).and_then(finite),
            q75: quantile(&sorted, 0.75).and_then(finite),
            max: finite(max),
        }
    }

    fn empty() -> Self {
        Self {
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        }
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Quantile of already sorted data by linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    let v = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    if v.is_finite() {
        Some(v)
    } else {
        // the spread overflowed
        Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
    }
}

/// Statistics for a categorical column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    /// Number of distinct non-missing values
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first
    pub top: Option<String>,
    pub freq: Option<usize>,
}

impl CategoricalSummary {
    pub fn from_cells(cells: &[Option<String>]) -> Self {
        // value -> (frequency, first row)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut count = 0;
        for (row, cell) in cells.iter().enumerate() {
            if let Some(value) = cell {
                count += 1;
                counts.entry(value.as_str()).or_insert((0, row)).0 += 1;
            }
        }

        let top = counts
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(value, (freq, _))| (value.to_string(), *freq));

        Self {
            count,
            unique: counts.len(),
            freq: top.as_ref().map(|(_, freq)| *freq),
            top: top.map(|(value, _)| value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

impl ColumnSummary {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnSummary::Numeric(_) => ColumnKind::Numeric,
            ColumnSummary::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ColumnSummary::Numeric(s) => s.count,
            ColumnSummary::Categorical(s) => s.count,
        }
    }

    /// Value of one statistic, `None` when it is undefined or does not apply.
    pub fn value(&self, stat: Statistic) -> Option<StatValue> {
        use Statistic::*;
        match self {
            ColumnSummary::Numeric(s) => match stat {
                Count => Some(StatValue::Count(s.count)),
                Mean => s.mean.map(StatValue::Number),
                Std => s.std.map(StatValue::Number),
                Min => s.min.map(StatValue::Number),
                Q25 => s.q25.map(StatValue::Number),
                Median => s.median.map(StatValue::Number),
                Q75 => s.q75.map(StatValue::Number),
                Max => s.max.map(StatValue::Number),
                Unique | Top | Freq => None,
            },
            ColumnSummary::Categorical(s) => match stat {
                Count => Some(StatValue::Count(s.count)),
                Unique => Some(StatValue::Count(s.unique)),
                Top => s.top.clone().map(StatValue::Text),
                Freq => s.freq.map(StatValue::Count),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub summary: ColumnSummary,
}

/// Summary statistics for every column, in dataset order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub columns: Vec<ColumnStats>,
}

impl SummaryStats {
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| &c.summary)
    }

    /// Merge numeric and categorical statistics into one table.
    ///
    /// Cells are looked up by (statistic, column name), so a statistic that
    /// does not apply to a column's kind is simply N/A.
    pub fn table(&self) -> StatsTable {
        let has_kind = |kind| self.columns.iter().any(|c| c.summary.kind() == kind);
        let has_numeric = has_kind(ColumnKind::Numeric);
        let has_categorical = has_kind(ColumnKind::Categorical);

        let statistics: Vec<Statistic> = Statistic::ALL
            .iter()
            .copied()
            .filter(|s| {
                (has_numeric && s.applies_to(ColumnKind::Numeric))
                    || (has_categorical && s.applies_to(ColumnKind::Categorical))
            })
            .collect();

        let cells = statistics
            .iter()
            .map(|&stat| self.columns.iter().map(|c| c.summary.value(stat)).collect())
            .collect();

        StatsTable {
            statistics,
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            cells,
        }
    }
}

/// Compute descriptive statistics for every column of the dataset.
pub fn compute_summary_stats(dataset: &Dataset) -> Result<SummaryStats> {
    if dataset.column_count() == 0 {
        return Err(AnalysisError::EmptyDataset("dataset has no columns".into()));
    }

    let columns = dataset
        .columns()
        .iter()
        .map(|col| {
            let summary = match col.data() {
                ColumnData::Numeric(cells) => {
                    let values: Vec<f64> = cells.iter().flatten().copied().collect();
                    ColumnSummary::Numeric(NumericSummary::from_values(&values))
                }
                ColumnData::Categorical(cells) => {
                    ColumnSummary::Categorical(CategoricalSummary::from_cells(cells))
                }
            };
            ColumnStats {
                name: col.name().to_string(),
                summary,
            }
        })
        .collect();

    log::debug!(
        "Computed summary statistics for {} columns over {} rows",
        dataset.column_count(),
        dataset.row_count()
    );
    Ok(SummaryStats { columns })
}

// ---------------------------------------------------------------------------
// Merged statistics table
// ---------------------------------------------------------------------------

/// Row labels of the merged statistics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Count,
    Unique,
    Top,
    Freq,
    Mean,
    Std,
    Min,
    Q25,
    Median,
    Q75,
    Max,
}

impl Statistic {
    pub const ALL: [Statistic; 11] = [
        Statistic::Count,
        Statistic::Unique,
        Statistic::Top,
        Statistic::Freq,
        Statistic::Mean,
        Statistic::Std,
        Statistic::Min,
        Statistic::Q25,
        Statistic::Median,
        Statistic::Q75,
        Statistic::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Unique => "unique",
            Statistic::Top => "top",
            Statistic::Freq => "freq",
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Q25 => "25%",
            Statistic::Median => "50%",
            Statistic::Q75 => "75%",
            Statistic::Max => "max",
        }
    }

    pub fn applies_to(self, kind: ColumnKind) -> bool {
        match self {
            Statistic::Count => true,
            Statistic::Unique | Statistic::Top | Statistic::Freq => {
                kind == ColumnKind::Categorical
            }
            _ => kind == ColumnKind::Numeric,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    Number(f64),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Number(v) => write!(f, "{v}"),
            StatValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One row per statistic, one column per dataset column.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    pub statistics: Vec<Statistic>,
    pub columns: Vec<String>,
    /// `cells[row][col]`; `None` renders as N/A
    pub cells: Vec<Vec<Option<StatValue>>>,
}

impl StatsTable {
    pub fn cell(&self, stat: Statistic, column: &str) -> Option<&StatValue> {
        let row = self.statistics.iter().position(|&s| s == stat)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.cells[row][col].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn diamonds() -> Dataset {
        Dataset::new(vec![
            Column::numeric(
                "carat",
                vec![Some(0.23), Some(0.21), None, Some(0.29), Some(0.31)],
            ),
            Column::categorical(
                "cut",
                vec![
                    Some("Ideal".into()),
                    Some("Premium".into()),
                    Some("Good".into()),
                    Some("Premium".into()),
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_numeric_summary_basic() {
        let data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let s = NumericSummary::from_values(&data);

        assert_eq!(s.count, 10);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(10.0));
        assert!((s.mean.unwrap() - 5.5).abs() < 1e-10);
        assert!((s.median.unwrap() - 5.5).abs() < 1e-10);
        assert!((s.q25.unwrap() - 3.25).abs() < 1e-10);
        assert!((s.q75.unwrap() - 7.75).abs() < 1e-10);
        // sample std of 1..=10
        assert!((s.std.unwrap() - 3.0276503540974917).abs() < 1e-10);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let s = NumericSummary::from_values(&[4.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert_eq!(s.median, Some(4.0));
    }

    #[test]
    fn test_empty_column_is_all_na() {
        let s = NumericSummary::from_values(&[]);
        assert_eq!(s, NumericSummary::empty());
    }

    #[test]
    fn test_mean_stays_within_range() {
        let s = NumericSummary::from_values(&[0.1, 0.1, 0.1]);
        assert!(s.mean.unwrap() >= s.min.unwrap());
        assert!(s.mean.unwrap() <= s.max.unwrap());
    }

    #[test]
    fn test_extreme_values_never_produce_non_finite_stats() {
        let s = NumericSummary::from_values(&[f64::MAX, f64::MAX]);
        assert_eq!(s.mean, Some(f64::MAX));
        assert_eq!(s.std, Some(0.0));

        let s = NumericSummary::from_values(&[-f64::MAX, f64::MAX]);
        assert_eq!(s.mean, Some(0.0));
        assert_eq!(s.std, None);
        assert_eq!(s.median, Some(0.0));
        assert_eq!(s.min, Some(-f64::MAX));
    }

    #[test]
    fn test_categorical_mode_ties_first_seen() {
        let cells = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            None,
        ];
        let s = CategoricalSummary::from_cells(&cells);
        assert_eq!(s.count, 4);
        assert_eq!(s.unique, 2);
        assert_eq!(s.top.as_deref(), Some("b"));
        assert_eq!(s.freq, Some(2));
    }

    #[test]
    fn test_compute_summary_stats() {
        let stats = compute_summary_stats(&diamonds()).unwrap();

        match stats.get("carat").unwrap() {
            ColumnSummary::Numeric(s) => {
                assert_eq!(s.count, 4);
                assert!((s.mean.unwrap() - 0.26).abs() < 1e-10);
            }
            other => panic!("unexpected summary {other:?}"),
        }
        match stats.get("cut").unwrap() {
            ColumnSummary::Categorical(s) => {
                assert_eq!(s.count, 4);
                assert_eq!(s.unique, 3);
                assert_eq!(s.top.as_deref(), Some("Premium"));
                assert_eq!(s.freq, Some(2));
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn test_table_merges_by_column_name() {
        let table = compute_summary_stats(&diamonds()).unwrap().table();

        let labels: Vec<&str> = table.statistics.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(table.columns, vec!["carat", "cut"]);
        assert_eq!(table.cell(Statistic::Count, "carat"), Some(&StatValue::Count(4)));
        assert_eq!(
            table.cell(Statistic::Top, "cut"),
            Some(&StatValue::Text("Premium".into()))
        );
        assert_eq!(table.cell(Statistic::Top, "carat"), None);
        assert_eq!(table.cell(Statistic::Mean, "cut"), None);
    }

    #[test]
    fn test_table_numeric_only_has_no_categorical_rows() {
        let ds = Dataset::new(vec![Column::numeric("x", vec![Some(1.0), Some(2.0)])]).unwrap();
        let table = compute_summary_stats(&ds).unwrap().table();
        assert_eq!(table.statistics.len(), 8);
        assert!(!table.statistics.contains(&Statistic::Top));
    }

    #[test]
    fn test_no_columns_is_empty_dataset() {
        let ds = Dataset::new(Vec::new()).unwrap();
        assert!(matches!(
            compute_summary_stats(&ds),
            Err(AnalysisError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_quantile_edges() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[2.0], 0.75), Some(2.0));
        assert_eq!(quantile(&[1.0, 3.0], 0.5), Some(2.0));
        assert_eq!(quantile(&[1.0, 3.0], 1.5), None);
    }
}
