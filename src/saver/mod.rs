//! Run persistence
//!
//! ## File naming
//!
//! ```text
//! {root}/{model}/{run_id}/tab_{level}_{origin}_{phase}.csv|.parquet
//! {root}/{model}/{run_id}/fig_{level}_{origin}_{column}_{phase}.json
//! ```

mod fs;

use std::path::{Path, PathBuf};

pub use fs::{FsRunSaver, TableFormat};

use crate::keys::{FigureKey, TableKey};
use crate::packet::VisualizedRun;
use crate::Result;

/// Extension of persisted figures.
pub const FIGURE_EXTENSION: &str = "json";

/// Persists the tables and figures of a finished run.
pub trait RunSaver: Send + Sync {
    /// Write every non-empty table and every figure of `run`.
    ///
    /// # Errors
    ///
    /// Returns error if any file cannot be written; files are never overwritten
    fn save(&self, run: &VisualizedRun) -> Result<SaveReport>;
}

/// What a save wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    location: PathBuf,
    tables_written: usize,
    tables_skipped: usize,
    figures_written: usize,
}

impl SaveReport {
    /// Create an empty report for `location`.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            tables_written: 0,
            tables_skipped: 0,
            figures_written: 0,
        }
    }

    /// Get the run directory.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Number of table files written.
    #[must_use]
    pub const fn tables_written(&self) -> usize {
        self.tables_written
    }

    /// Number of empty tables skipped.
    #[must_use]
    pub const fn tables_skipped(&self) -> usize {
        self.tables_skipped
    }

    /// Number of figure files written.
    #[must_use]
    pub const fn figures_written(&self) -> usize {
        self.figures_written
    }

    pub(crate) fn into_location(self) -> PathBuf {
        self.location
    }
}

/// File stem of the table stored under `key`.
///
/// ```rust
/// use trueno_pipeline::keys::{AbstractionLevel, DataOrigin, ProcessPhase, TableKey};
/// use trueno_pipeline::saver::table_file_stem;
///
/// let key = TableKey::new(DataOrigin::Trainer, AbstractionLevel::Epoch, ProcessPhase::Train);
/// assert_eq!(table_file_stem(&key), "tab_epoch_trainer_train");
/// ```
#[must_use]
pub fn table_file_stem(key: &TableKey) -> String {
    format!(
        "tab_{}_{}_{}",
        key.abstraction_level(),
        key.origin(),
        key.phase()
    )
}

/// File stem of the figure stored under `key`.
#[must_use]
pub fn figure_file_stem(key: &FigureKey) -> String {
    format!(
        "fig_{}_{}_{}_{}",
        key.abstraction_level(),
        key.origin(),
        key.column(),
        key.phase()
    )
}

/// Directory of run `run_id` of model `model` under `root`.
#[must_use]
pub fn run_directory(root: &Path, model: &str, run_id: &str) -> PathBuf {
    root.join(model).join(run_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{AbstractionLevel, Column, DataOrigin, ProcessPhase};

    #[test]
    fn test_figure_file_stem() {
        let key = FigureKey::new(
            DataOrigin::Calculator,
            AbstractionLevel::Instance,
            Column::DistributionComparison,
            ProcessPhase::Test,
        );
        assert_eq!(
            figure_file_stem(&key),
            "fig_instance_calculator_distribution_comparison_test"
        );
    }

    #[test]
    fn test_run_directory() {
        let dir = run_directory(Path::new("/data/models"), "m1", "m1_train_0");
        assert_eq!(dir, PathBuf::from("/data/models/m1/m1_train_0"));
    }
}
