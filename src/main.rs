use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use diamond_analyzer::analysis::{
    compute_correlation_matrix, compute_missing_report, compute_summary_stats,
    compute_unique_report, dataset_info, fit_linear_trend, prepare_plot, CorrelationMatrix,
    PlotData, PlotKind,
};
use diamond_analyzer::{render, AnalysisConfig, AnalysisError, Dataset, Session};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Scatter,
    Line,
    HistX,
    HistY,
}

impl From<KindArg> for PlotKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Scatter => PlotKind::Scatter,
            KindArg::Line => PlotKind::Line,
            KindArg::HistX => PlotKind::HistogramX,
            KindArg::HistY => PlotKind::HistogramY,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "diamond-analyzer",
    version,
    about = "Exploratory analysis of tabular diamond data",
    after_help = r#"
EXAMPLES:
  diamond-analyzer summary
  diamond-analyzer --file diamonds.parquet correlation --column price
  diamond-analyzer plot --x carat --y price --kind scatter
  diamond-analyzer export --output stats.csv
"#
)]
struct Cli {
    /// Data file (.csv, .tsv, .xlsx, .xls, .ods, .parquet, .json).
    /// Defaults to the configured autoload file.
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the action log after the command.
    #[arg(long)]
    show_log: bool,

    /// Emit reports as JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shape, memory estimate and column kinds.
    Info,
    /// Descriptive statistics for every column.
    Summary,
    /// Missing values per column.
    Missing,
    /// Distinct values per column.
    Unique,
    /// Correlation of one numeric column against the others.
    Correlation {
        /// Defaults to the first numeric column.
        #[arg(long)]
        column: Option<String>,
    },
    /// Full correlation matrix and the strongest pairs.
    Heatmap,
    /// Least-squares trend of y against x.
    Trend {
        #[arg(long)]
        x: String,
        #[arg(long)]
        y: String,
    },
    /// Series for a scatter, line or histogram plot.
    Plot {
        #[arg(long)]
        x: String,
        #[arg(long)]
        y: String,
        #[arg(long, value_enum, default_value = "scatter")]
        kind: KindArg,
        #[arg(long)]
        bins: Option<usize>,
    },
    /// Write the statistics table to CSV.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let mut session = Session::new(config);

    let outcome = load(&cli, &mut session).and_then(|()| execute(&cli, &mut session));

    if cli.show_log {
        println!();
        for entry in session.log.entries() {
            println!("{entry}");
        }
    }
    outcome
}

fn load(cli: &Cli, session: &mut Session) -> Result<()> {
    match &cli.file {
        Some(path) => {
            session
                .load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }
        None => {
            if session.autoload().is_none() {
                bail!(
                    "no dataset loaded: pass --file or place {} in the working directory",
                    session.config.autoload_path.display()
                );
            }
        }
    }
    if let Some(status) = &session.status_message {
        eprintln!("{status}");
    }
    Ok(())
}

/// Run an analysis through the session, turning a logged failure into an error.
fn run<T>(
    session: &mut Session,
    action: &str,
    f: impl FnOnce(&Dataset) -> diamond_analyzer::Result<T>,
) -> Result<T> {
    session.run(action, f).ok_or_else(|| {
        anyhow!(session
            .status_message
            .clone()
            .unwrap_or_else(|| format!("{action} failed")))
    })
}

/// The requested column, or the first numeric one.
fn correlation_target(
    matrix: &CorrelationMatrix,
    column: Option<&str>,
) -> diamond_analyzer::Result<String> {
    match column {
        Some(c) => Ok(c.to_string()),
        None => matrix
            .names()
            .first()
            .cloned()
            .ok_or_else(|| AnalysisError::EmptyDataset("no numeric columns".into())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn execute(cli: &Cli, session: &mut Session) -> Result<()> {
    let config = session.config.clone();

    match &cli.command {
        Command::Info => {
            let info = run(session, "dataset info", |ds| Ok(dataset_info(ds)))?;
            if cli.json {
                print_json(&info)?;
            } else {
                print!("{}", render::info_text(&info));
            }
        }
        Command::Summary => {
            let stats = run(session, "statistics", compute_summary_stats)?;
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("{}", render::summary_table(&stats.table()));
            }
        }
        Command::Missing => {
            let report = run(session, "missing values", |ds| {
                Ok(compute_missing_report(ds, config.missing_threshold_percent))
            })?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", render::missing_table(&report));
                let flagged: Vec<&str> = report.problematic().map(|e| e.column.as_str()).collect();
                if !flagged.is_empty() {
                    println!(
                        "More than {}% missing: {}",
                        config.missing_threshold_percent,
                        flagged.join(", ")
                    );
                }
            }
        }
        Command::Unique => {
            let report = run(session, "unique values", |ds| {
                Ok(compute_unique_report(ds, config.unique_limits()))
            })?;
            if cli.json {
                print_json(&report)?;
            } else {
                print!("{}", render::unique_text(&report));
            }
        }
        Command::Correlation { column } => {
            let (target, ranked) = run(session, "correlation", |ds| {
                let matrix = compute_correlation_matrix(ds)?;
                let target = correlation_target(&matrix, column.as_deref())?;
                let ranked = matrix.ranked_against(&target)?;
                Ok((target, ranked))
            })?;
            if cli.json {
                print_json(&ranked)?;
            } else {
                println!("{}", render::ranking_table(&target, &ranked));
            }
        }
        Command::Heatmap => {
            let matrix = run(session, "correlation heatmap", compute_correlation_matrix)?;
            let pairs = matrix.strongest_pairs(config.strongest_pairs);
            if cli.json {
                print_json(&serde_json::json!({ "matrix": matrix, "strongest_pairs": pairs }))?;
            } else {
                println!("{}", render::heatmap_table(&matrix));
                print!("{}", render::strongest_pairs_text(&pairs));
            }
        }
        Command::Trend { x, y } => {
            let fit = run(session, "trend", |ds| fit_linear_trend(ds, x, y))?;
            if cli.json {
                print_json(&fit)?;
            } else {
                println!("{}", render::trend_text(&fit));
            }
        }
        Command::Plot { x, y, kind, bins } => {
            let bins = bins.unwrap_or(config.histogram_bins);
            let plot = run(session, "plot", |ds| prepare_plot(ds, x, y, (*kind).into(), bins))?;
            if cli.json {
                print_json(&plot)?;
            } else {
                println!("{}", render::plot_table(&plot));
                if let PlotData::Scatter { trend: Some(fit), .. } = &plot {
                    println!("{}", render::trend_text(fit));
                }
            }
        }
        Command::Export { output } => {
            let path = output.clone().unwrap_or_else(|| config.export_path.clone());
            session
                .export_summary(&path)
                .with_context(|| format!("Failed to export statistics to {}", path.display()))?;
            println!("Statistics exported to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_analyzer::Column;

    #[test]
    fn test_correlation_target_defaults_to_first_numeric_column() {
        let ds = Dataset::new(vec![
            Column::categorical("cut", vec![Some("Ideal".into()), Some("Good".into())]),
            Column::numeric("carat", vec![Some(0.23), Some(0.31)]),
            Column::numeric("price", vec![Some(326.0), Some(335.0)]),
        ])
        .unwrap();
        let matrix = compute_correlation_matrix(&ds).unwrap();

        assert_eq!(correlation_target(&matrix, None).unwrap(), "carat");
        assert_eq!(correlation_target(&matrix, Some("price")).unwrap(), "price");
    }

    #[test]
    fn test_cli_parses_plot_command() {
        let cli = Cli::try_parse_from([
            "diamond-analyzer",
            "--json",
            "plot",
            "--x",
            "carat",
            "--y",
            "price",
            "--kind",
            "hist-y",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Plot { kind: KindArg::HistY, bins: None, .. }
        ));
    }
}
