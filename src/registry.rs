//! Named adapter registry
//!
//! Three independent name → adapter maps, shared by every run that refers
//! to adapters by name. Backed by `DashMap`, so registration and lookup are
//! safe from concurrent runs.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trueno_pipeline::adapter::ReplayModule;
//! use trueno_pipeline::config::ModuleConfig;
//! use trueno_pipeline::RunRegistry;
//!
//! let registry = RunRegistry::new();
//! let config = ModuleConfig::builder(["total_energy"]).build()?;
//! registry.register_module(Arc::new(ReplayModule::new("d1", config)));
//!
//! assert!(registry.module("d1").is_ok());
//! assert!(registry.module("d2").is_err());
//! # Ok::<(), trueno_pipeline::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::adapter::{AdapterKind, AdapterSet, ModelAdapter, ModuleAdapter, TrainerAdapter};
use crate::{Error, Result};

/// Registry of model, module and trainer adapters by name.
#[derive(Default)]
pub struct RunRegistry {
    models: DashMap<String, Arc<dyn ModelAdapter>>,
    modules: DashMap<String, Arc<dyn ModuleAdapter>>,
    trainers: DashMap<String, Arc<dyn TrainerAdapter>>,
}

fn register<T: ?Sized>(
    map: &DashMap<String, Arc<T>>,
    kind: AdapterKind,
    name: &str,
    adapter: Arc<T>,
) {
    if map.insert(name.to_string(), adapter).is_some() {
        warn!(%kind, name, "Replaced previously registered adapter");
    } else {
        debug!(%kind, name, "Adapter registered");
    }
}

fn lookup<T: ?Sized>(map: &DashMap<String, Arc<T>>, kind: AdapterKind, name: &str) -> Result<Arc<T>> {
    map.get(name)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| Error::AdapterNotFound {
            kind,
            name: name.to_string(),
        })
}

impl RunRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model adapter under its name (last writer wins).
    pub fn register_model(&self, model: Arc<dyn ModelAdapter>) {
        let name = model.name().to_string();
        register(&self.models, AdapterKind::Model, &name, model);
    }

    /// Register a module adapter under its name (last writer wins).
    pub fn register_module(&self, module: Arc<dyn ModuleAdapter>) {
        let name = module.name().to_string();
        register(&self.modules, AdapterKind::Module, &name, module);
    }

    /// Register a trainer adapter under its name (last writer wins).
    pub fn register_trainer(&self, trainer: Arc<dyn TrainerAdapter>) {
        let name = trainer.name().to_string();
        register(&self.trainers, AdapterKind::Trainer, &name, trainer);
    }

    /// Look up a model adapter.
    ///
    /// # Errors
    ///
    /// Returns `Error::AdapterNotFound` if `name` was never registered
    pub fn model(&self, name: &str) -> Result<Arc<dyn ModelAdapter>> {
        lookup(&self.models, AdapterKind::Model, name)
    }

    /// Look up a module adapter.
    ///
    /// # Errors
    ///
    /// Returns `Error::AdapterNotFound` if `name` was never registered
    pub fn module(&self, name: &str) -> Result<Arc<dyn ModuleAdapter>> {
        lookup(&self.modules, AdapterKind::Module, name)
    }

    /// Look up a trainer adapter.
    ///
    /// # Errors
    ///
    /// Returns `Error::AdapterNotFound` if `name` was never registered
    pub fn trainer(&self, name: &str) -> Result<Arc<dyn TrainerAdapter>> {
        lookup(&self.trainers, AdapterKind::Trainer, name)
    }

    /// Resolve a model/module/trainer triad.
    ///
    /// # Errors
    ///
    /// Returns `Error::AdapterNotFound` for the first name that does not resolve
    pub fn resolve(&self, model: &str, module: &str, trainer: &str) -> Result<AdapterSet> {
        Ok(AdapterSet::new(
            self.model(model)?,
            self.module(module)?,
            self.trainer(trainer)?,
        ))
    }

    /// Number of registered model adapters.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of registered module adapters.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Number of registered trainer adapters.
    #[must_use]
    pub fn trainer_count(&self) -> usize {
        self.trainers.len()
    }
}

impl fmt::Debug for RunRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRegistry")
            .field("models", &self.model_count())
            .field("modules", &self.module_count())
            .field("trainers", &self.trainer_count())
            .finish()
    }
}
