//! Process station: `InitializedRun` → `ProcessedRun`

use tracing::{debug, info};

use super::{Station, StationOutcome};
use crate::adapter::adapter_failure;
use crate::keys::{DataOrigin, ProcessType};
use crate::packet::{InitializedRun, ProcessedRun, RunPacket};
use crate::store::tag_origin;
use crate::Result;

/// Executes a process through the trainer and collects the adapters' logs.
///
/// After the blocking process call both the trainer and the model are
/// finalized; their last logs are tagged with [`DataOrigin::Trainer`] and
/// [`DataOrigin::Model`] and unioned, trainer first. An adapter without logs
/// contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct ProcessStation {
    process_type: ProcessType,
}

impl ProcessStation {
    /// Station name.
    pub const NAME: &'static str = "process";

    /// Create a station running `process_type`.
    #[must_use]
    pub const fn new(process_type: ProcessType) -> Self {
        Self { process_type }
    }

    /// Station that fits the model.
    #[must_use]
    pub const fn training() -> Self {
        Self::new(ProcessType::Train)
    }

    /// Station that tests the model.
    #[must_use]
    pub const fn testing() -> Self {
        Self::new(ProcessType::Test)
    }

    /// Get the process type this station runs.
    #[must_use]
    pub const fn process_type(&self) -> ProcessType {
        self.process_type
    }

    /// Run the process on `run`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The trainer fails or does not support the process (`Error::UnsupportedProcess`)
    /// - Finalizing the trainer or the model fails
    pub fn execute(&self, run: InitializedRun) -> Result<ProcessedRun> {
        let model = run.model().as_ref();
        let module = run.module().as_ref();
        let trainer = run.trainer().as_ref();

        info!(
            run_id = run.run_id(),
            process = %self.process_type,
            trainer = trainer.name(),
            "Running process"
        );
        match self.process_type {
            ProcessType::Train => trainer.train(model, module),
            ProcessType::Validation => trainer.validate(model, module),
            ProcessType::Test => trainer.test(model, module),
        }
        .map_err(|err| adapter_failure(trainer.name(), err))?;

        trainer
            .finalize()
            .map_err(|err| adapter_failure(trainer.name(), err))?;
        let trainer_logs = trainer.last_logs().unwrap_or_default();

        model
            .finalize()
            .map_err(|err| adapter_failure(model.name(), err))?;
        let model_logs = model.last_logs().unwrap_or_default();

        debug!(
            trainer_tables = trainer_logs.len(),
            model_tables = model_logs.len(),
            "Collected adapter logs"
        );
        let tables = tag_origin(trainer_logs, DataOrigin::Trainer)
            .union(tag_origin(model_logs, DataOrigin::Model));

        Ok(run.into_processed(self.process_type, tables))
    }
}

impl Station for ProcessStation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        let run = packet.into_initialized(Self::NAME)?;
        Ok(StationOutcome::Continue(self.execute(run)?.into()))
    }
}
