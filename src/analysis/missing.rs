use serde::Serialize;

use crate::data::model::Dataset;

/// Columns missing more than this share of rows are flagged.
pub const DEFAULT_PROBLEMATIC_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub missing: usize,
    /// `100 * missing / rows`, within [0, 100]
    pub percent: f64,
    pub problematic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingReport {
    pub total_rows: usize,
    pub entries: Vec<MissingEntry>,
}

impl MissingReport {
    pub fn get(&self, column: &str) -> Option<&MissingEntry> {
        self.entries.iter().find(|e| e.column == column)
    }

    pub fn problematic(&self) -> impl Iterator<Item = &MissingEntry> {
        self.entries.iter().filter(|e| e.problematic)
    }
}

/// Count missing cells per column and flag those above `threshold_percent`.
pub fn compute_missing_report(dataset: &Dataset, threshold_percent: f64) -> MissingReport {
    let total_rows = dataset.row_count();

    let entries = dataset
        .columns()
        .iter()
        .map(|col| {
            let missing = col.missing_count();
            let percent = if total_rows == 0 {
                0.0
            } else {
                (100.0 * missing as f64 / total_rows as f64).clamp(0.0, 100.0)
            };
            MissingEntry {
                column: col.name().to_string(),
                missing,
                percent,
                problematic: percent > threshold_percent,
            }
        })
        .collect::<Vec<_>>();

    let flagged = entries.iter().filter(|e| e.problematic).count();
    if flagged > 0 {
        log::warn!("{flagged} column(s) exceed {threshold_percent}% missing values");
    }

    MissingReport {
        total_rows,
        entries,
    }
}
