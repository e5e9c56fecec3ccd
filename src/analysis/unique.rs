use std::collections::HashSet;

use serde::Serialize;

use crate::data::model::{CellValue, Column, Dataset};

/// How many distinct values are listed per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueLimits {
    /// Columns with at most this many distinct values are listed in full.
    pub display_threshold: usize,
    /// Otherwise only this many values are listed, in first-seen order.
    pub sample_size: usize,
}

impl Default for UniqueLimits {
    fn default() -> Self {
        Self {
            display_threshold: 10,
            sample_size: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueEntry {
    pub column: String,
    /// Distinct non-missing values
    pub distinct: usize,
    /// Sorted full list, or a first-seen sample when `truncated`
    pub values: Vec<CellValue>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueReport {
    pub entries: Vec<UniqueEntry>,
}

impl UniqueReport {
    pub fn get(&self, column: &str) -> Option<&UniqueEntry> {
        self.entries.iter().find(|e| e.column == column)
    }
}

/// Distinct values of a column in order of first occurrence.
fn distinct_in_order(column: &Column) -> Vec<CellValue> {
    let mut seen = HashSet::new();
    column
        .cells()
        .flatten()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

pub fn compute_unique_report(dataset: &Dataset, limits: UniqueLimits) -> UniqueReport {
    let entries = dataset
        .columns()
        .iter()
        .map(|col| {
            let mut values = distinct_in_order(col);
            let distinct = values.len();
            let truncated = distinct > limits.display_threshold;
            if truncated {
                values.truncate(limits.sample_size);
            } else {
                values.sort();
            }
            UniqueEntry {
                column: col.name().to_string(),
                distinct,
                values,
                truncated,
            }
        })
        .collect();

    UniqueReport { entries }
}
