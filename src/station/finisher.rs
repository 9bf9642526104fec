//! Finisher: `VisualizedRun` → terminal

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::{Station, StationOutcome};
use crate::history::{FinishedRun, RunHistory};
use crate::packet::{RunPacket, VisualizedRun};
use crate::saver::RunSaver;
use crate::Result;

/// Persists a run and records it in the run history.
///
/// Always the last station: it ends the pipeline with
/// [`StationOutcome::Terminate`]. A run is recorded only after its save
/// succeeded.
pub struct RunFinisher {
    saver: Box<dyn RunSaver>,
    history: RunHistory,
    next_run: AtomicU64,
}

impl RunFinisher {
    /// Station name.
    pub const NAME: &'static str = "finisher";

    /// Create a finisher persisting through `saver`.
    #[must_use]
    pub fn new(saver: impl RunSaver + 'static) -> Self {
        Self {
            saver: Box::new(saver),
            history: RunHistory::new(),
            next_run: AtomicU64::new(0),
        }
    }

    /// Reserve the next run number, unique across every launcher sharing this finisher.
    pub fn next_run_number(&self) -> u64 {
        self.next_run.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of run numbers reserved so far.
    #[must_use]
    pub fn runs_numbered(&self) -> u64 {
        self.next_run.load(Ordering::Relaxed)
    }

    /// Persist `run` and append it to the history.
    ///
    /// # Errors
    ///
    /// Returns error if the saver fails; the history is left unchanged
    pub fn finish(&self, run: VisualizedRun) -> Result<Arc<FinishedRun>> {
        let report = self.saver.save(&run)?;
        let finished = self.history.push(run.into_finished(Some(report.into_location())));
        info!(
            run_id = finished.run_id(),
            persisted = self.history.len(),
            "Run finished"
        );
        Ok(finished)
    }

    /// Get the run history.
    #[must_use]
    pub const fn history(&self) -> &RunHistory {
        &self.history
    }

    /// Number of runs persisted so far.
    #[must_use]
    pub fn persisted_count(&self) -> usize {
        self.history.len()
    }
}

impl fmt::Debug for RunFinisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunFinisher")
            .field("persisted", &self.history.len())
            .field("runs_numbered", &self.runs_numbered())
            .finish_non_exhaustive()
    }
}

impl Station for RunFinisher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        self.finish(packet.into_visualized(Self::NAME)?)?;
        Ok(StationOutcome::Terminate)
    }
}
