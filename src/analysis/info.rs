use serde::Serialize;

use crate::data::model::{ColumnData, ColumnKind, Dataset};

/// Per-cell overhead assumed for a stored string.
const STRING_OVERHEAD: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// Shape and column kinds of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    /// Rough in-memory size of the cell data
    pub memory_bytes: usize,
    pub column_kinds: Vec<ColumnInfo>,
}

pub fn dataset_info(dataset: &Dataset) -> DatasetInfo {
    let column_kinds: Vec<ColumnInfo> = dataset
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            kind: c.kind(),
        })
        .collect();

    let numeric_columns = column_kinds
        .iter()
        .filter(|c| c.kind == ColumnKind::Numeric)
        .count();

    let memory_bytes = dataset
        .columns()
        .iter()
        .map(|c| match c.data() {
            ColumnData::Numeric(v) => v.len() * std::mem::size_of::<f64>(),
            ColumnData::Categorical(v) => v
                .iter()
                .map(|cell| cell.as_ref().map_or(0, String::len) + STRING_OVERHEAD)
                .sum(),
        })
        .sum();

    DatasetInfo {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        numeric_columns,
        categorical_columns: dataset.column_count() - numeric_columns,
        memory_bytes,
        column_kinds,
    }
}
