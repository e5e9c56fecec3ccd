use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single displayable cell
// ---------------------------------------------------------------------------

/// A non-missing cell value as shown in reports.
///
/// Unique-value listings are sorted, so `CellValue` must be `Ord`:
/// numbers sort before text, numbers by `total_cmp`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can sort and deduplicate cell values --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        match (self, other) {
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Number(_), Text(_)) => std::cmp::Ordering::Less,
            (Text(_), Number(_)) => std::cmp::Ordering::Greater,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Number(v) => v.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

/// Which family of statistics applies to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Cell storage; `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Build a numeric column. NaN and infinite cells are stored as missing,
    /// and `-0.0` is stored as `0.0`.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).map(|x| if x == 0.0 { 0.0 } else { x }))
            .collect();
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Decide the column kind from raw text cells.
    ///
    /// The column is numeric when every non-missing cell parses as a float,
    /// including the degenerate case of a column with no values at all.
    pub fn infer(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|cell| match cell {
                Some(s) => s.trim().parse::<f64>().ok().map(Some),
                None => Some(None),
            })
            .collect();

        let name = name.into();
        match parsed {
            Some(values) => {
                log::debug!("column '{name}' inferred as numeric");
                Column::numeric(name, values)
            }
            None => {
                log::debug!("column '{name}' inferred as categorical");
                Column::categorical(name, cells)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn valid_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Numeric cells, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Non-missing numeric values in row order.
    pub fn valid_numbers(&self) -> Option<Vec<f64>> {
        self.as_numeric()
            .map(|cells| cells.iter().flatten().copied().collect())
    }

    /// Every cell in row order as a displayable value.
    pub fn cells(&self) -> Box<dyn Iterator<Item = Option<CellValue>> + '_> {
        match &self.data {
            ColumnData::Numeric(v) => Box::new(v.iter().map(|c| c.map(CellValue::Number))),
            ColumnData::Categorical(v) => {
                Box::new(v.iter().map(|c| c.clone().map(CellValue::Text)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Assemble a dataset, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(AnalysisError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
            if col.len() != row_count {
                return Err(AnalysisError::InvalidDataset(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    col.name(),
                    col.len()
                )));
            }
        }

        Ok(Dataset {
            columns,
            row_count,
            source: None,
        })
    }

    /// Record the file this dataset was read from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
    }

    /// Look up a column that must exist and be numeric.
    pub fn numeric_column(&self, name: &str) -> Result<&[Option<f64>]> {
        let col = self
            .column(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))?;
        col.as_numeric()
            .ok_or_else(|| AnalysisError::NotNumeric(name.to_string()))
    }
}
