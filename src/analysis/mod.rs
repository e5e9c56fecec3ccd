//! Analysis pipeline
//!
//! Every function here is a pure transformation of a loaded [`Dataset`]:
//!
//! - [`summary`]: descriptive statistics and the merged statistics table
//! - [`correlation`]: pairwise Pearson matrix, rankings, strongest pairs
//! - [`missing`]: missing-value counts and percentages
//! - [`unique`]: distinct values per column
//! - [`trend`]: least-squares trend between two columns
//! - [`plot`]: scatter / line / histogram series
//! - [`info`]: shape and column kinds
//!
//! [`Dataset`]: crate::data::model::Dataset

pub mod correlation;
pub mod info;
pub mod missing;
pub mod plot;
pub mod summary;
pub mod trend;
pub mod unique;

pub use correlation::{compute_correlation_matrix, CorrelationMatrix, CorrelationPair};
pub use info::{dataset_info, DatasetInfo};
pub use missing::{compute_missing_report, MissingReport, DEFAULT_PROBLEMATIC_PERCENT};
pub use plot::{histogram, prepare_plot, Histogram, PlotData, PlotKind, DEFAULT_BINS};
pub use summary::{
    compute_summary_stats, ColumnSummary, StatValue, Statistic, StatsTable, SummaryStats,
};
pub use trend::{fit_linear_trend, TrendFit};
pub use unique::{compute_unique_report, UniqueLimits, UniqueReport};
