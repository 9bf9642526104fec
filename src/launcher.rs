//! Run launcher
//!
//! Starts runs either by adapter names (resolved through a [`RunRegistry`])
//! or with adapters passed in directly, and drives them through the fixed
//! station sequence:
//!
//! ```text
//! initializing → process(type) → visualisation → statistic_calculation → finisher
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::adapter::AdapterSet;
use crate::history::FinishedRun;
use crate::keys::ProcessType;
use crate::packet::StartRun;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::registry::RunRegistry;
use crate::station::{
    InitializingStation, ProcessStation, RunFinisher, Station, StatisticCalculation,
    VisualisationStation,
};
use crate::{Error, Result};

/// Builds and drives one pipeline per run.
#[derive(Debug)]
pub struct RunLauncher {
    registry: Arc<RunRegistry>,
    finisher: Arc<RunFinisher>,
    visualisation: VisualisationStation,
    calculation: StatisticCalculation,
}

impl RunLauncher {
    /// Create a launcher resolving names in `registry` and finishing runs with `finisher`.
    #[must_use]
    pub fn new(registry: Arc<RunRegistry>, finisher: Arc<RunFinisher>) -> Self {
        Self {
            registry,
            finisher,
            visualisation: VisualisationStation::new(),
            calculation: StatisticCalculation::new(),
        }
    }

    /// Use a customized visualisation station.
    #[must_use]
    pub fn with_visualisation(mut self, station: VisualisationStation) -> Self {
        self.visualisation = station;
        self
    }

    /// Use a customized calculation station.
    #[must_use]
    pub const fn with_calculation(mut self, station: StatisticCalculation) -> Self {
        self.calculation = station;
        self
    }

    /// Get the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    /// Get the finisher.
    #[must_use]
    pub const fn finisher(&self) -> &Arc<RunFinisher> {
        &self.finisher
    }

    /// Number of runs launched through the shared finisher, successful or not.
    #[must_use]
    pub fn runs_launched(&self) -> u64 {
        self.finisher.runs_numbered()
    }

    /// Run the adapters registered under the given names.
    ///
    /// # Errors
    ///
    /// Returns `Error::AdapterNotFound` if a name does not resolve, or any
    /// error raised by a station
    pub fn run_by_name(
        &self,
        model: &str,
        module: &str,
        trainer: &str,
        process_type: ProcessType,
    ) -> Result<Arc<FinishedRun>> {
        let adapters = self.registry.resolve(model, module, trainer)?;
        self.run_with(adapters, process_type)
    }

    /// Run the adapters registered under the given names, with the process
    /// type given as text (`train`, `validation` or `test`).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for an unknown process type, otherwise
    /// as [`run_by_name`](Self::run_by_name)
    pub fn run_from_str(
        &self,
        model: &str,
        module: &str,
        trainer: &str,
        process_type: &str,
    ) -> Result<Arc<FinishedRun>> {
        self.run_by_name(model, module, trainer, process_type.parse()?)
    }

    /// Run `adapters` directly, bypassing the registry.
    ///
    /// # Errors
    ///
    /// Returns any error raised by a station; a failed run is not persisted
    pub fn run_with(
        &self,
        adapters: AdapterSet,
        process_type: ProcessType,
    ) -> Result<Arc<FinishedRun>> {
        let counter = self.finisher.next_run_number();
        let run_id = format!("{}_{process_type}_{counter}", adapters.model().name());

        info!(run_id = %run_id, process = %process_type, "Launching run");
        let start = StartRun::new(run_id.clone(), adapters);
        let outcome = self.pipeline(process_type).run(start).map_err(|err| {
            error!(run_id = %run_id, error = %err, "Run failed");
            err
        })?;

        match outcome {
            PipelineOutcome::Terminated { .. } => {
                self.finisher.history().find(&run_id).ok_or_else(|| {
                    Error::Other(format!("Run '{run_id}' terminated without being recorded"))
                })
            }
            PipelineOutcome::Exhausted { stations_run, .. } => Err(Error::Other(format!(
                "Run '{run_id}' ran out of stations after {stations_run} without reaching the finisher"
            ))),
        }
    }

    /// The station sequence of a run of `process_type`.
    #[must_use]
    pub fn pipeline(&self, process_type: ProcessType) -> Pipeline {
        let finisher: Arc<dyn Station> = self.finisher.clone();
        Pipeline::default()
            .station(InitializingStation::new())
            .station(ProcessStation::new(process_type))
            .station(self.visualisation.clone())
            .station(self.calculation)
            .shared_station(finisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ReplayModel, ReplayModule, ReplayTrainer};
    use crate::config::{ModelConfig, ModuleConfig, TrainerConfig};
    use crate::saver::FsRunSaver;
    use tempfile::TempDir;

    fn launcher(root: &TempDir) -> RunLauncher {
        let registry = RunRegistry::new();
        registry.register_model(Arc::new(ReplayModel::new(
            "m1",
            ModelConfig::builder(["total_energy"]).build().unwrap(),
        )));
        registry.register_module(Arc::new(ReplayModule::new(
            "d1",
            ModuleConfig::builder(["total_energy"]).build().unwrap(),
        )));
        registry.register_trainer(Arc::new(ReplayTrainer::new(
            "t1",
            TrainerConfig::builder(1).build().unwrap(),
        )));
        RunLauncher::new(
            Arc::new(registry),
            Arc::new(RunFinisher::new(FsRunSaver::new(root.path()))),
        )
    }

    #[test]
    fn test_pipeline_station_order() {
        let root = TempDir::new().unwrap();
        let names = launcher(&root).pipeline(ProcessType::Test).station_names();
        assert_eq!(
            names,
            vec![
                "initializing",
                "process",
                "visualisation",
                "statistic_calculation",
                "finisher"
            ]
        );
    }

    #[test]
    fn test_run_ids_count_up() {
        let root = TempDir::new().unwrap();
        let launcher = launcher(&root);

        let first = launcher.run_by_name("m1", "d1", "t1", ProcessType::Test).unwrap();
        let second = launcher.run_from_str("m1", "d1", "t1", "train").unwrap();

        assert_eq!(first.run_id(), "m1_test_0");
        assert_eq!(second.run_id(), "m1_train_1");
        assert_eq!(launcher.runs_launched(), 2);
        assert_eq!(launcher.finisher().persisted_count(), 2);
    }

    #[test]
    fn test_unknown_names_and_process_types() {
        let root = TempDir::new().unwrap();
        let launcher = launcher(&root);

        assert!(matches!(
            launcher.run_by_name("m2", "d1", "t1", ProcessType::Train),
            Err(Error::AdapterNotFound { .. })
        ));
        assert!(matches!(
            launcher.run_from_str("m1", "d1", "t1", "predict"),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(launcher.runs_launched(), 0);
        assert_eq!(launcher.finisher().persisted_count(), 0);
    }

    #[test]
    fn test_launchers_sharing_a_finisher_never_reuse_run_ids() {
        let root = TempDir::new().unwrap();
        let first = launcher(&root);
        let second = RunLauncher::new(Arc::clone(first.registry()), Arc::clone(first.finisher()));

        let a = first.run_by_name("m1", "d1", "t1", ProcessType::Test).unwrap();
        let b = second.run_by_name("m1", "d1", "t1", ProcessType::Test).unwrap();

        assert_eq!(a.run_id(), "m1_test_0");
        assert_eq!(b.run_id(), "m1_test_1");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(second.runs_launched(), 2);
        assert_eq!(first.finisher().persisted_count(), 2);
    }
}
