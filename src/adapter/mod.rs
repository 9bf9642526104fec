//! External collaborator contracts
//!
//! The pipeline never trains anything itself. It drives three adapters:
//! - [`ModelAdapter`]: the predictive model and its metric logging
//! - [`ModuleAdapter`]: the dataset loader
//! - [`TrainerAdapter`]: the training loop, which runs the model over the module
//!
//! Adapter failures are reported as [`anyhow::Error`] and surface in the
//! pipeline as [`Error::Adapter`].

pub mod logging;
pub mod replay;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::keys::{ProcessPhase, ProcessType};
use crate::store::AdapterLogs;
use crate::table::Table;
use crate::Error;

pub use logging::{prefixed_metric_name, MetricLog, PrefixedMetricLog};
pub use replay::{ReplayModel, ReplayModule, ReplayTrainer};

/// Which of the three adapter roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Model adapter
    Model,
    /// Data module adapter
    Module,
    /// Trainer adapter
    Trainer,
}

impl AdapterKind {
    /// Lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Module => "module",
            Self::Trainer => "trainer",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predictive model with its own metric logging.
pub trait ModelAdapter: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Descriptive snapshot (`params` and `metrics` text columns).
    ///
    /// # Errors
    ///
    /// Returns error if the model cannot describe itself
    fn metadata(&self) -> anyhow::Result<Table>;

    /// Run the model over one phase of the module's data.
    ///
    /// Called by the trainer for every phase of a process, in order.
    ///
    /// # Errors
    ///
    /// Returns error if the phase fails
    fn run_phase(&self, phase: ProcessPhase, module: &dyn ModuleAdapter) -> anyhow::Result<()>;

    /// Flush logging buffers into [`last_logs`](Self::last_logs).
    ///
    /// # Errors
    ///
    /// Returns error if the buffered logs cannot be converted to tables
    fn finalize(&self) -> anyhow::Result<()>;

    /// Logs flushed by the last [`finalize`](Self::finalize), if any.
    fn last_logs(&self) -> Option<AdapterLogs>;
}

/// A dataset loader.
pub trait ModuleAdapter: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Arbitrary descriptive value.
    ///
    /// # Errors
    ///
    /// Returns error if the module cannot describe itself
    fn metadata(&self) -> anyhow::Result<serde_json::Value>;
}

/// A training loop.
pub trait TrainerAdapter: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Hyperparameter snapshot (exposes `max_epoch`).
    ///
    /// # Errors
    ///
    /// Returns error if the trainer cannot describe itself
    fn metadata(&self) -> anyhow::Result<Table>;

    /// Fit `model` on `module` (blocking).
    ///
    /// # Errors
    ///
    /// Returns error if fitting fails
    fn train(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()>;

    /// Test `model` on `module` (blocking).
    ///
    /// # Errors
    ///
    /// Returns error if testing fails
    fn test(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()>;

    /// Validate `model` on `module` (blocking).
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedProcess` unless the trainer overrides it
    fn validate(&self, model: &dyn ModelAdapter, module: &dyn ModuleAdapter) -> anyhow::Result<()> {
        let _ = (model, module);
        Err(Error::UnsupportedProcess(ProcessType::Validation).into())
    }

    /// Flush logging buffers into [`last_logs`](Self::last_logs).
    ///
    /// # Errors
    ///
    /// Returns error if the buffered logs cannot be converted to tables
    fn finalize(&self) -> anyhow::Result<()>;

    /// Logs flushed by the last [`finalize`](Self::finalize), if any.
    fn last_logs(&self) -> Option<AdapterLogs>;
}

/// Convert an adapter failure into a crate error.
///
/// Crate errors raised inside an adapter keep their variant; anything else
/// is wrapped as [`Error::Adapter`].
pub fn adapter_failure(adapter: &str, err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => Error::adapter(adapter, err),
    }
}

/// The model, module and trainer of one run.
#[derive(Clone)]
pub struct AdapterSet {
    model: Arc<dyn ModelAdapter>,
    module: Arc<dyn ModuleAdapter>,
    trainer: Arc<dyn TrainerAdapter>,
}

impl AdapterSet {
    /// Bundle three adapters.
    #[must_use]
    pub fn new(
        model: Arc<dyn ModelAdapter>,
        module: Arc<dyn ModuleAdapter>,
        trainer: Arc<dyn TrainerAdapter>,
    ) -> Self {
        Self {
            model,
            module,
            trainer,
        }
    }

    /// Get the model adapter.
    #[must_use]
    pub fn model(&self) -> &Arc<dyn ModelAdapter> {
        &self.model
    }

    /// Get the module adapter.
    #[must_use]
    pub fn module(&self) -> &Arc<dyn ModuleAdapter> {
        &self.module
    }

    /// Get the trainer adapter.
    #[must_use]
    pub fn trainer(&self) -> &Arc<dyn TrainerAdapter> {
        &self.trainer
    }
}

impl fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterSet")
            .field("model", &self.model.name())
            .field("module", &self.module.name())
            .field("trainer", &self.trainer.name())
            .finish()
    }
}
