//! Text rendering of reports for the command line shell

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::analysis::correlation::{CorrelationMatrix, CorrelationPair};
use crate::analysis::info::DatasetInfo;
use crate::analysis::missing::MissingReport;
use crate::analysis::plot::PlotData;
use crate::analysis::summary::{StatValue, StatsTable};
use crate::analysis::trend::TrendFit;
use crate::analysis::unique::UniqueReport;
use crate::data::model::CellValue;

const NOT_AVAILABLE: &str = "N/A";

/// Two decimals, or four for magnitudes below 0.01.
pub fn format_number(v: f64) -> String {
    if v.abs() >= 0.01 {
        format!("{v:.2}")
    } else {
        format!("{v:.4}")
    }
}

pub fn format_optional(v: Option<f64>) -> String {
    v.map_or_else(|| NOT_AVAILABLE.to_string(), format_number)
}

fn format_stat(v: Option<&StatValue>) -> String {
    match v {
        Some(StatValue::Number(n)) => format_number(*n),
        Some(other) => other.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn summary_table(stats: &StatsTable) -> Table {
    let mut table = new_table();
    let mut header = vec![String::new()];
    header.extend(stats.columns.iter().cloned());
    table.set_header(header);

    for (stat, row) in stats.statistics.iter().zip(&stats.cells) {
        let mut cells = vec![stat.label().to_string()];
        cells.extend(row.iter().map(|v| format_stat(v.as_ref())));
        table.add_row(cells);
    }
    table
}

pub fn info_text(info: &DatasetInfo) -> String {
    let mut text = String::from("DATASET OVERVIEW\n\n");
    text += &format!("• Size: {} rows, {} columns\n", info.rows, info.columns);
    text += &format!("• Memory: {:.1} KB\n\n", info.memory_bytes as f64 / 1024.0);
    text += "COLUMN KINDS:\n";
    text += &format!("• numeric: {} columns\n", info.numeric_columns);
    text += &format!("• categorical: {} columns\n", info.categorical_columns);
    text += "\nCOLUMNS:\n";
    for col in &info.column_kinds {
        text += &format!("• {}: {}\n", col.name, col.kind);
    }
    text
}

/// Problematic columns are highlighted.
pub fn missing_table(report: &MissingReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Column", "Missing", "%"]);
    for entry in &report.entries {
        let cells = [
            entry.column.clone(),
            entry.missing.to_string(),
            format!("{:.2}%", entry.percent),
        ];
        let row: Vec<Cell> = cells
            .into_iter()
            .map(|c| {
                let cell = Cell::new(c);
                if entry.problematic {
                    cell.fg(Color::Yellow)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(row);
    }
    table
}

fn value_list(values: &[CellValue]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

pub fn unique_text(report: &UniqueReport) -> String {
    let mut text = String::from("UNIQUE VALUES PER COLUMN:\n\n");
    for entry in &report.entries {
        text += &format!("• {}: {} unique values", entry.column, entry.distinct);
        if entry.truncated {
            text += &format!(
                " (first {}: {}...)\n",
                entry.values.len(),
                value_list(&entry.values)
            );
        } else {
            text += &format!(" → {}\n", value_list(&entry.values));
        }
    }
    text
}

pub fn ranking_table(column: &str, ranked: &[(String, Option<f64>)]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Column".to_string(), format!("r with {column}")]);
    for (name, r) in ranked {
        table.add_row(vec![name.clone(), format_optional(*r)]);
    }
    table
}

pub fn heatmap_table(matrix: &CorrelationMatrix) -> Table {
    let mut table = new_table();
    let mut header = vec![String::new()];
    header.extend(matrix.names().iter().cloned());
    table.set_header(header);

    for (i, name) in matrix.names().iter().enumerate() {
        let mut row = vec![name.clone()];
        row.extend((0..matrix.len()).map(|j| format_optional(matrix.value_at(i, j))));
        table.add_row(row);
    }
    table
}

pub fn strongest_pairs_text(pairs: &[CorrelationPair]) -> String {
    let mut text = String::from("Strongest correlations:\n");
    for pair in pairs {
        text += &format!("• {} & {}: {:.3}\n", pair.col_a, pair.col_b, pair.r);
    }
    text
}

pub fn trend_text(fit: &TrendFit) -> String {
    format!(
        "{y} = {slope:.4} * {x} + {intercept:.4}\nR² = {r2:.3}, r = {r}, n = {n}",
        y = fit.y_column,
        x = fit.x_column,
        slope = fit.slope,
        intercept = fit.intercept,
        r2 = fit.r_squared,
        r = fit.r.map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.3}")),
        n = fit.n,
    )
}

pub fn plot_table(plot: &PlotData) -> Table {
    let mut table = new_table();
    match plot {
        PlotData::Scatter { points, .. } | PlotData::Line { points } => {
            table.set_header(vec!["x", "y"]);
            for [x, y] in points {
                table.add_row(vec![format_number(*x), format_number(*y)]);
            }
        }
        PlotData::Histogram(h) => {
            table.set_header(vec!["from", "to", "count"]);
            for (lo, hi, count) in h.bins() {
                table.add_row(vec![format_number(lo), format_number(hi), count.to_string()]);
            }
        }
    }
    table
}
