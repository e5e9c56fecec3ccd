use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::analysis::summary::compute_summary_stats;
use crate::config::AnalysisConfig;
use crate::data::loader::load_dataset_with;
use crate::data::model::Dataset;
use crate::error::{AnalysisError, Result};
use crate::export::export_summary_csv;

// ---------------------------------------------------------------------------
// Action log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Timestamped list of user-visible events, mirrored to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message,
        });
    }

    fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message,
        });
    }

    /// Drop all entries, leaving a note that the log was cleared.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.push("log cleared");
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Shell-side state: the current dataset, the action log and the last
/// status message. Pipeline errors stop here; the session stays usable
/// with whatever dataset it held before.
pub struct Session {
    /// Loaded dataset (None until a load succeeds).
    dataset: Option<Dataset>,

    pub config: AnalysisConfig,

    pub log: ActionLog,

    /// Status line shown to the user.
    pub status_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        let mut log = ActionLog::default();
        log.push("session started");
        Self {
            dataset: None,
            config,
            log,
            status_message: None,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Load a file and make it the current dataset.
    ///
    /// On failure the previous dataset is kept and the error is logged.
    pub fn load(&mut self, path: &Path) -> Result<&Dataset> {
        match load_dataset_with(path, &self.config.load_options()) {
            Ok(dataset) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.log.push(format!("loaded file: {name}"));
                self.status_message = Some(format!("{} rows loaded", dataset.row_count()));
                Ok(&*self.dataset.insert(dataset))
            }
            Err(e) => {
                self.log.push_error(format!("load failed: {e}"));
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Load the configured default dataset if that file exists.
    pub fn autoload(&mut self) -> Option<&Dataset> {
        let path = self.config.autoload_path.clone();
        if !path.exists() {
            log::debug!("No dataset to autoload at {}", path.display());
            return None;
        }
        self.load(&path).ok()
    }

    /// Run an analysis against the current dataset.
    ///
    /// Errors, including a missing dataset, are logged and become `None`.
    pub fn run<T>(&mut self, action: &str, f: impl FnOnce(&Dataset) -> Result<T>) -> Option<T> {
        let outcome = match &self.dataset {
            Some(dataset) => f(dataset),
            None => Err(AnalysisError::NoDataset),
        };
        match outcome {
            Ok(value) => {
                self.log.push(format!("{action} updated"));
                Some(value)
            }
            Err(e) => {
                self.log.push_error(format!("{action} failed: {e}"));
                self.status_message = Some(format!("Error: {e}"));
                None
            }
        }
    }

    /// Compute the summary statistics and write them to `path`.
    pub fn export_summary(&mut self, path: &Path) -> Result<()> {
        let outcome = self
            .dataset
            .as_ref()
            .ok_or(AnalysisError::NoDataset)
            .and_then(compute_summary_stats)
            .and_then(|stats| export_summary_csv(&stats, path));

        match &outcome {
            Ok(()) => self
                .log
                .push(format!("statistics exported to {}", path.display())),
            Err(e) => {
                self.log.push_error(format!("export failed: {e}"));
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        outcome
    }
}
