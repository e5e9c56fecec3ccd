//! Diamond Analyzer: exploratory analysis of tabular diamond data.
//!
//! Files are loaded into a column-typed [`Dataset`](data::model::Dataset)
//! and every analysis in [`analysis`] is a pure function of it. The
//! [`session`] module holds the shell-side state (current dataset, action
//! log) and [`render`] turns reports into terminal tables.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod render;
pub mod session;

pub use config::AnalysisConfig;
pub use data::loader::{load_dataset, load_dataset_with, LoadOptions};
pub use data::model::{CellValue, Column, ColumnKind, Dataset};
pub use error::{AnalysisError, Result};
pub use session::Session;
