//! Capability proxies
//!
//! Read-only accessor bundles a packet stage is composed of. A stage holds
//! one named field per capability it offers and forwards to it.

use std::sync::Arc;

use serde_json::Value;

use crate::adapter::{AdapterSet, ModelAdapter, ModuleAdapter, TrainerAdapter};
use crate::figure::Figure;
use crate::keys::{FigureKey, ProcessType, TableKey};
use crate::store::{FigureStore, TableStore};
use crate::table::Table;
use crate::Result;

/// Access to the run's three adapters.
#[derive(Debug, Clone)]
pub struct AdapterAccess {
    adapters: AdapterSet,
}

impl AdapterAccess {
    /// Wrap an adapter set.
    #[must_use]
    pub const fn new(adapters: AdapterSet) -> Self {
        Self { adapters }
    }

    /// Get the adapter set.
    #[must_use]
    pub const fn adapters(&self) -> &AdapterSet {
        &self.adapters
    }

    /// Get the model adapter.
    #[must_use]
    pub fn model(&self) -> &Arc<dyn ModelAdapter> {
        self.adapters.model()
    }

    /// Get the module adapter.
    #[must_use]
    pub fn module(&self) -> &Arc<dyn ModuleAdapter> {
        self.adapters.module()
    }

    /// Get the trainer adapter.
    #[must_use]
    pub fn trainer(&self) -> &Arc<dyn TrainerAdapter> {
        self.adapters.trainer()
    }
}

/// Access to the adapters' metadata snapshots.
#[derive(Debug, Clone)]
pub struct MetadataAccess {
    model: Table,
    module: Value,
    trainer: Table,
}

impl MetadataAccess {
    /// Bundle the three snapshots.
    #[must_use]
    pub const fn new(model: Table, module: Value, trainer: Table) -> Self {
        Self {
            model,
            module,
            trainer,
        }
    }

    /// Get the model metadata table.
    #[must_use]
    pub const fn model(&self) -> &Table {
        &self.model
    }

    /// Get the module metadata value.
    #[must_use]
    pub const fn module(&self) -> &Value {
        &self.module
    }

    /// Get the trainer metadata table.
    #[must_use]
    pub const fn trainer(&self) -> &Table {
        &self.trainer
    }
}

/// Access to the metric tables produced by a process.
#[derive(Debug, Clone)]
pub struct LoggingDataAccess {
    process_type: ProcessType,
    tables: TableStore,
}

impl LoggingDataAccess {
    /// Bundle the executed process type with its tables.
    #[must_use]
    pub const fn new(process_type: ProcessType, tables: TableStore) -> Self {
        Self {
            process_type,
            tables,
        }
    }

    /// Get the executed process type.
    #[must_use]
    pub const fn process_type(&self) -> ProcessType {
        self.process_type
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

    pub(crate) fn tables_mut(&mut self) -> &mut TableStore {
        &mut self.tables
    }

    pub(crate) fn into_tables(self) -> TableStore {
        self.tables
    }
}

/// Access to the figures derived from the tables.
#[derive(Debug, Clone, Default)]
pub struct FigureAccess {
    figures: FigureStore,
}

impl FigureAccess {
    /// Wrap a figure store.
    #[must_use]
    pub const fn new(figures: FigureStore) -> Self {
        Self { figures }
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

    pub(crate) fn figures_mut(&mut self) -> &mut FigureStore {
        &mut self.figures
    }

    pub(crate) fn into_figures(self) -> FigureStore {
        self.figures
    }
}
