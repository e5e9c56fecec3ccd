use std::io::Write;
use std::path::Path;

use crate::analysis::summary::SummaryStats;
use crate::error::{AnalysisError, Result};

/// Default file name for the exported statistics.
pub const DEFAULT_EXPORT_FILE: &str = "diamond_statistics.csv";

/// Write the merged statistics table as CSV.
///
/// The header is an empty index label followed by the column names; each
/// following row starts with the statistic label. N/A cells are empty.
pub fn write_summary_csv<W: Write>(stats: &SummaryStats, writer: W) -> csv::Result<()> {
    let table = stats.table();
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec![String::new()];
    header.extend(table.columns.iter().cloned());
    out.write_record(&header)?;

    for (stat, row) in table.statistics.iter().zip(&table.cells) {
        let mut record = vec![stat.label().to_string()];
        record.extend(
            row.iter()
                .map(|cell| cell.as_ref().map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Export the statistics table to `path`.
pub fn export_summary_csv(stats: &SummaryStats, path: &Path) -> Result<()> {
    let export_err = |source| AnalysisError::Export {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(|e| export_err(csv::Error::from(e)))?;
    write_summary_csv(stats, file).map_err(export_err)?;

    log::info!("Exported summary statistics to {}", path.display());
    Ok(())
}
