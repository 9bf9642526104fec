//! Packet stages
//!
//! ```text
//! StartRun ──► InitializedRun ──► ProcessedRun ──► VisualizedRun ──► FinishedRun
//!  adapters     + metadata         + tables         + figures          (read-only)
//! ```
//!
//! Every transition consumes its predecessor, so a stage can never be read
//! after its successor exists.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use super::proxy::{AdapterAccess, FigureAccess, LoggingDataAccess, MetadataAccess};
use crate::adapter::{AdapterSet, ModelAdapter, ModuleAdapter, TrainerAdapter};
use crate::figure::Figure;
use crate::history::{FinishedRun, RunRecord, RunStatus};
use crate::keys::{FigureKey, ProcessType, TableKey};
use crate::store::{FigureStore, TableStore};
use crate::table::Table;
use crate::Result;

/// A run that has not been initialized yet.
#[derive(Debug)]
pub struct StartRun {
    record: RunRecord,
    adapters: AdapterAccess,
}

impl StartRun {
    /// Start a run of `adapters` under `run_id`.
    #[must_use]
    pub fn new(run_id: impl Into<String>, adapters: AdapterSet) -> Self {
        let mut record = RunRecord::builder(run_id)
            .model(adapters.model().name())
            .module(adapters.module().name())
            .trainer(adapters.trainer().name())
            .build();
        record.start();
        Self {
            record,
            adapters: AdapterAccess::new(adapters),
        }
    }

    /// Attach the metadata snapshots.
    #[must_use]
    pub fn into_initialized(self, metadata: MetadataAccess) -> InitializedRun {
        InitializedRun {
            record: self.record,
            adapters: self.adapters,
            metadata,
        }
    }
}

/// A run whose adapters have been described.
#[derive(Debug)]
pub struct InitializedRun {
    record: RunRecord,
    adapters: AdapterAccess,
    metadata: MetadataAccess,
}

impl InitializedRun {
    /// Attach the tables produced by `process_type`.
    #[must_use]
    pub fn into_processed(mut self, process_type: ProcessType, tables: TableStore) -> ProcessedRun {
        self.record.set_process_type(process_type);
        ProcessedRun {
            record: self.record,
            adapters: self.adapters,
            metadata: self.metadata,
            logging: LoggingDataAccess::new(process_type, tables),
        }
    }
}

/// A run whose process has executed.
#[derive(Debug)]
pub struct ProcessedRun {
    record: RunRecord,
    adapters: AdapterAccess,
    metadata: MetadataAccess,
    logging: LoggingDataAccess,
}

impl ProcessedRun {
    /// Attach the figures derived from the tables.
    #[must_use]
    pub fn into_visualized(self, figures: FigureStore) -> VisualizedRun {
        VisualizedRun {
            record: self.record,
            adapters: self.adapters,
            metadata: self.metadata,
            logging: self.logging,
            figures: FigureAccess::new(figures),
        }
    }
}

/// A run with figures; later stations may still add tables and figures.
#[derive(Debug)]
pub struct VisualizedRun {
    record: RunRecord,
    adapters: AdapterAccess,
    metadata: MetadataAccess,
    logging: LoggingDataAccess,
    figures: FigureAccess,
}

impl VisualizedRun {
    /// Store a derived table, returning the one it replaced.
    pub fn add_table(&mut self, key: TableKey, table: Table) -> Option<Table> {
        self.logging.tables_mut().put(key, table)
    }

    /// Store a derived figure, returning the one it replaced.
    pub fn add_figure(&mut self, key: FigureKey, figure: Figure) -> Option<Figure> {
        self.figures.figures_mut().put(key, figure)
    }

    /// Freeze the run after it was persisted to `location`.
    #[must_use]
    pub fn into_finished(mut self, location: Option<PathBuf>) -> FinishedRun {
        if let Some(location) = location {
            self.record.set_location(location);
        }
        self.record.complete(RunStatus::Success);
        FinishedRun::new(
            self.record,
            self.metadata,
            self.logging.into_tables(),
            self.figures.into_figures(),
        )
    }
}

macro_rules! forward_record {
    ($($stage:ty),*) => {
        $(impl $stage {
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
        })*
    };
}

macro_rules! forward_adapters {
    ($($stage:ty),*) => {
        $(impl $stage {
            /// Get the adapter set.
            #[must_use]
            pub const fn adapters(&self) -> &AdapterSet {
                self.adapters.adapters()
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
        })*
    };
}

macro_rules! forward_metadata {
    ($($stage:ty),*) => {
        $(impl $stage {
            /// Get the metadata snapshots.
            #[must_use]
            pub const fn metadata(&self) -> &MetadataAccess {
                &self.metadata
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
        })*
    };
}

macro_rules! forward_logging {
    ($($stage:ty),*) => {
        $(impl $stage {
            /// Get the executed process type.
            #[must_use]
            pub const fn process_type(&self) -> ProcessType {
                self.logging.process_type()
            }

            /// Get the table store.
            #[must_use]
            pub const fn tables(&self) -> &TableStore {
                self.logging.tables()
            }

            /// Get one table.
            ///
            /// # Errors
            ///
            /// Returns `Error::KeyNotFound` if no table is stored under `key`
            pub fn table(&self, key: &TableKey) -> Result<&Table> {
                self.logging.table(key)
            }
        })*
    };
}

forward_record!(StartRun, InitializedRun, ProcessedRun, VisualizedRun);
forward_adapters!(StartRun, InitializedRun, ProcessedRun, VisualizedRun);
forward_metadata!(InitializedRun, ProcessedRun, VisualizedRun);
forward_logging!(ProcessedRun, VisualizedRun);

impl VisualizedRun {
    /// Get the figure store.
    #[must_use]
    pub const fn figures(&self) -> &FigureStore {
        self.figures.figures()
    }

    /// Get one figure.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no figure is stored under `key`
    pub fn figure(&self, key: &FigureKey) -> Result<&Figure> {
        self.figures.figure(key)
    }
}
