//! Run history
//!
//! Finished runs are frozen into [`FinishedRun`]s and appended to a
//! [`RunHistory`]. Only runs that reached the finisher are recorded.

mod run_record;

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

pub use run_record::{RunRecord, RunRecordBuilder, RunStatus};

use crate::figure::Figure;
use crate::keys::{FigureKey, TableKey};
use crate::packet::MetadataAccess;
use crate::store::{FigureStore, TableStore};
use crate::table::Table;
use crate::Result;

/// Terminal, read-only state of a persisted run.
#[derive(Debug)]
pub struct FinishedRun {
    record: RunRecord,
    metadata: MetadataAccess,
    tables: TableStore,
    figures: FigureStore,
}

impl FinishedRun {
    pub(crate) const fn new(
        record: RunRecord,
        metadata: MetadataAccess,
        tables: TableStore,
        figures: FigureStore,
    ) -> Self {
        Self {
            record,
            metadata,
            tables,
            figures,
        }
    }

    /// Get the run record.
    #[must_use]
    pub const fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        self.record.run_id()
    }

    /// Get the model metadata table.
    #[must_use]
    pub const fn model_metadata(&self) -> &Table {
        self.metadata.model()
    }

    /// Get the module metadata value.
    #[must_use]
    pub const fn module_metadata(&self) -> &Value {
        self.metadata.module()
    }

    /// Get the trainer metadata table.
    #[must_use]
    pub const fn trainer_metadata(&self) -> &Table {
        self.metadata.trainer()
    }

    /// Get the table store.
    #[must_use]
    pub const fn tables(&self) -> &TableStore {
        &self.tables
    }

    /// Get one table.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no table is stored under `key`
    pub fn table(&self, key: &TableKey) -> Result<&Table> {
        self.tables.get(key)
    }

    /// Get the figure store.
    #[must_use]
    pub const fn figures(&self) -> &FigureStore {
        &self.figures
    }

    /// Get one figure.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no figure is stored under `key`
    pub fn figure(&self, key: &FigureKey) -> Result<&Figure> {
        self.figures.get(key)
    }
}

/// Append-only list of finished runs, shareable across threads.
#[derive(Debug, Default)]
pub struct RunHistory {
    runs: Mutex<Vec<Arc<FinishedRun>>>,
}

impl RunHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn runs(&self) -> MutexGuard<'_, Vec<Arc<FinishedRun>>> {
        // A panic while pushing cannot leave the Vec half-written
        self.runs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append a run and return the shared handle.
    pub fn push(&self, run: FinishedRun) -> Arc<FinishedRun> {
        let run = Arc::new(run);
        self.runs().push(Arc::clone(&run));
        run
    }

    /// Number of recorded runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs().len()
    }

    /// Check if no run was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs().is_empty()
    }

    /// Snapshot of every recorded run, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<FinishedRun>> {
        self.runs().clone()
    }

    /// Most recently recorded run.
    #[must_use]
    pub fn last(&self) -> Option<Arc<FinishedRun>> {
        self.runs().last().cloned()
    }

    /// Look up a run by ID.
    #[must_use]
    pub fn find(&self, run_id: &str) -> Option<Arc<FinishedRun>> {
        self.runs()
            .iter()
            .find(|run| run.run_id() == run_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Column, ProcessType};
    use crate::table::text_row;

    fn finished(run_id: &str) -> FinishedRun {
        let mut record = RunRecord::builder(run_id)
            .process_type(ProcessType::Test)
            .build();
        record.start();
        record.complete(RunStatus::Success);
        let metadata = MetadataAccess::new(
            text_row(vec![(Column::Params, "p".to_string())]).unwrap(),
            Value::Null,
            text_row(vec![(Column::MaxEpoch, "1".to_string())]).unwrap(),
        );
        FinishedRun::new(record, metadata, TableStore::new(), FigureStore::new())
    }

    #[test]
    fn test_history_appends_in_order() {
        let history = RunHistory::new();
        assert!(history.is_empty());

        history.push(finished("a"));
        history.push(finished("b"));

        assert_eq!(history.len(), 2);
        let ids: Vec<String> = history
            .snapshot()
            .iter()
            .map(|run| run.run_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(history.last().unwrap().run_id(), "b");
    }

    #[test]
    fn test_find_run() {
        let history = RunHistory::new();
        history.push(finished("m1_test_0"));

        let run = history.find("m1_test_0").unwrap();
        assert_eq!(run.record().status(), RunStatus::Success);
        assert!(history.find("missing").is_none());
    }
}
