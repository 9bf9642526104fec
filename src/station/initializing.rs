//! Initializing station: `StartRun` → `InitializedRun`

use tracing::debug;

use super::{Station, StationOutcome};
use crate::adapter::adapter_failure;
use crate::packet::{InitializedRun, MetadataAccess, RunPacket, StartRun};
use crate::Result;

/// Reads the metadata snapshots of all three adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitializingStation;

impl InitializingStation {
    /// Station name.
    pub const NAME: &'static str = "initializing";

    /// Create the station.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Describe the adapters of `run`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Adapter` if any adapter fails to describe itself
    pub fn initialize(&self, run: StartRun) -> Result<InitializedRun> {
        let model = run.model();
        let module = run.module();
        let trainer = run.trainer();

        let metadata = MetadataAccess::new(
            model
                .metadata()
                .map_err(|err| adapter_failure(model.name(), err))?,
            module
                .metadata()
                .map_err(|err| adapter_failure(module.name(), err))?,
            trainer
                .metadata()
                .map_err(|err| adapter_failure(trainer.name(), err))?,
        );
        debug!(
            run_id = run.run_id(),
            model_columns = metadata.model().num_columns(),
            trainer_columns = metadata.trainer().num_columns(),
            "Adapter metadata extracted"
        );

        Ok(run.into_initialized(metadata))
    }
}

impl Station for InitializingStation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        let run = packet.into_start(Self::NAME)?;
        Ok(StationOutcome::Continue(self.initialize(run)?.into()))
    }
}
