//! Replay adapters
//!
//! Adapters that hand back pre-recorded logs instead of training anything.
//! They re-process a recorded run through the pipeline and act as test
//! collaborators. Recorded logs are released per phase: fitting releases the
//! train and validation phases, testing the test phase, validating the
//! validation phase.
//!
//! # Example
//!
//! ```rust
//! use trueno_pipeline::adapter::{ModelAdapter, ReplayModel, ReplayModule, ReplayTrainer, TrainerAdapter};
//! use trueno_pipeline::config::{ModelConfig, ModuleConfig, TrainerConfig};
//! use trueno_pipeline::keys::ProcessPhase;
//!
//! let model = ReplayModel::new("m1", ModelConfig::builder(["total_energy"]).build()?);
//! let module = ReplayModule::new("d1", ModuleConfig::builder(["total_energy"]).build()?);
//! let trainer = ReplayTrainer::new("t1", TrainerConfig::builder(2).build()?)
//!     .with_metrics(ProcessPhase::Train, 0, [("custom_train_epoch_loss", 0.9), ("epoch", 0.0)]);
//!
//! trainer.train(&model, &module)?;
//! trainer.finalize()?;
//! assert_eq!(trainer.last_logs().map(|logs| logs.len()), Some(1));
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use arrow::array::{ArrayRef, Int64Array};
use tracing::debug;

use super::{MetricLog, ModelAdapter, ModuleAdapter, PrefixedMetricLog, TrainerAdapter};
use crate::config::{ModelConfig, ModuleConfig, TrainerConfig};
use crate::keys::{AdapterKey, Column, ProcessPhase, ProcessType};
use crate::store::AdapterLogs;
use crate::table::{from_columns, text_row, MetricRow, Table};

fn locked<'a, T>(adapter: &str, mutex: &'a Mutex<T>) -> anyhow::Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("Log buffer of adapter '{adapter}' is poisoned"))
}

/// Model that replays recorded metric rows.
#[derive(Debug)]
pub struct ReplayModel {
    name: String,
    config: ModelConfig,
    recorded: Vec<(AdapterKey, MetricRow)>,
    log: Mutex<MetricLog>,
    last: Mutex<Option<AdapterLogs>>,
}

impl ReplayModel {
    /// Create a model without recorded rows.
    #[must_use]
    pub fn new(name: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            config,
            recorded: Vec::new(),
            log: Mutex::default(),
            last: Mutex::default(),
        }
    }

    /// Record a row released when `key`'s phase runs.
    #[must_use]
    pub fn with_row(mut self, key: AdapterKey, row: MetricRow) -> Self {
        self.recorded.push((key, row));
        self
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl ModelAdapter for ReplayModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> anyhow::Result<Table> {
        Ok(text_row(vec![
            (Column::Params, self.config.optimizer_summary()),
            (Column::Metrics, self.config.architecture_summary()),
        ])?)
    }

    fn run_phase(&self, phase: ProcessPhase, _module: &dyn ModuleAdapter) -> anyhow::Result<()> {
        let mut log = locked(&self.name, &self.log)?;
        for (key, row) in self.recorded.iter().filter(|(key, _)| key.phase() == phase) {
            log.record(*key, row.clone());
        }
        debug!(model = %self.name, phase = %phase, pending = log.pending_rows(), "Replayed model phase");
        Ok(())
    }

    fn finalize(&self) -> anyhow::Result<()> {
        let logs = locked(&self.name, &self.log)?.take_logs()?;
        *locked(&self.name, &self.last)? = Some(logs);
        Ok(())
    }

    fn last_logs(&self) -> Option<AdapterLogs> {
        self.last.lock().ok()?.clone()
    }
}

/// Data module described by its configuration.
#[derive(Debug, Clone)]
pub struct ReplayModule {
    name: String,
    config: ModuleConfig,
}

impl ReplayModule {
    /// Create a module.
    #[must_use]
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ModuleConfig {
        &self.config
    }
}

impl ModuleAdapter for ReplayModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.config)?)
    }
}

#[derive(Debug, Clone)]
struct RecordedMetrics {
    phase: ProcessPhase,
    step: u64,
    metrics: Vec<(String, f64)>,
}

/// Trainer that replays recorded flat metric maps.
///
/// Every process drives the model through the process's phases, then
/// releases the metric maps recorded for those phases.
#[derive(Debug)]
pub struct ReplayTrainer {
    name: String,
    config: TrainerConfig,
    recorded: Vec<RecordedMetrics>,
    log: Mutex<PrefixedMetricLog>,
}

impl ReplayTrainer {
    /// Create a trainer without recorded metrics.
    #[must_use]
    pub fn new(name: impl Into<String>, config: TrainerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            recorded: Vec::new(),
            log: Mutex::default(),
        }
    }

    /// Record a flat metric map logged at `step`, released when `phase` runs.
    #[must_use]
    pub fn with_metrics<I, S>(mut self, phase: ProcessPhase, step: u64, metrics: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.recorded.push(RecordedMetrics {
            phase,
            step,
            metrics: metrics
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        });
        self
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Hyperparameters moved by the last finalize.
    #[must_use]
    pub fn last_hparams(&self) -> Vec<serde_json::Value> {
        self.log
            .lock()
            .map(|log| log.last_hparams().to_vec())
            .unwrap_or_default()
    }

    fn replay(
        &self,
        process: ProcessType,
        model: &dyn ModelAdapter,
        module: &dyn ModuleAdapter,
    ) -> anyhow::Result<()> {
        let hparams = serde_json::to_value(&self.config)?;
        locked(&self.name, &self.log)?.log_hyperparams(hparams);

        for &phase in process.phases() {
            model.run_phase(phase, module)?;

            let mut log = locked(&self.name, &self.log)?;
            for recorded in self.recorded.iter().filter(|recorded| recorded.phase == phase) {
                log.log_metrics(&recorded.metrics, recorded.step);
            }
        }
        debug!(trainer = %self.name, process = %process, "Replayed process");
        Ok(())
    }
}

impl TrainerAdapter for ReplayTrainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> anyhow::Result<Table> {
        let max_epoch: ArrayRef = Arc::new(Int64Array::from(vec![i64::from(self.config.max_epochs())]));
        Ok(from_columns(vec![(Column::MaxEpoch, max_epoch)])?)
    }

    fn train(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()> {
        self.replay(ProcessType::Train, model, module)
    }

    fn test(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()> {
        self.replay(ProcessType::Test, model, module)
    }

    fn validate(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()> {
        self.replay(ProcessType::Validation, model, module)
    }

    fn finalize(&self) -> anyhow::Result<()> {
        locked(&self.name, &self.log)?.finalize().map_err(anyhow::Error::from)
    }

    fn last_logs(&self) -> Option<AdapterLogs> {
        self.log.lock().ok()?.last_logs().cloned()
    }
}
