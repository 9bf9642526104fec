//! # Trueno-Pipeline: Staged Run Processing for ML Experiments
//!
//! **Version**: 0.1.0
//!
//! Trueno-Pipeline drives one experiment run (a model, a data module and a
//! trainer) through a fixed sequence of stations and collects every table
//! and figure the run produces in a multi-axis keyed result store.
//!
//! ## Run lifecycle
//!
//! ```text
//! StartRun ─initializing→ InitializedRun ─process→ ProcessedRun
//!          ─visualisation→ VisualizedRun ─statistic_calculation→ VisualizedRun
//!          ─finisher→ FinishedRun (persisted, recorded in history)
//! ```
//!
//! Every transition consumes its predecessor. Errors abort the run before the
//! finisher, so a failed run is never persisted.
//!
//! ## Result store axes
//!
//! Tables are keyed by `DataOrigin × AbstractionLevel × ProcessPhase`
//! ([`keys::TableKey`]); figures additionally by a [`keys::Column`]
//! ([`keys::FigureKey`]).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trueno_pipeline::adapter::{ReplayModel, ReplayModule, ReplayTrainer};
//! use trueno_pipeline::config::{ModelConfig, ModuleConfig, TrainerConfig};
//! use trueno_pipeline::keys::ProcessType;
//! use trueno_pipeline::saver::FsRunSaver;
//! use trueno_pipeline::station::RunFinisher;
//! use trueno_pipeline::{RunLauncher, RunRegistry};
//!
//! let registry = RunRegistry::new();
//! registry.register_model(Arc::new(ReplayModel::new("m1", ModelConfig::builder(["energy"]).build()?)));
//! registry.register_module(Arc::new(ReplayModule::new("d1", ModuleConfig::builder(["energy"]).build()?)));
//! registry.register_trainer(Arc::new(ReplayTrainer::new("t1", TrainerConfig::builder(10).build()?)));
//!
//! let finisher = Arc::new(RunFinisher::new(FsRunSaver::new("runs")));
//! let launcher = RunLauncher::new(Arc::new(registry), finisher);
//!
//! let run = launcher.run_by_name("m1", "d1", "t1", ProcessType::Train)?;
//! println!("{} → {} tables", run.run_id(), run.tables().len());
//! # Ok::<(), trueno_pipeline::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod figure;
pub mod history;
pub mod keys;
pub mod launcher;
pub mod packet;
pub mod pipeline;
pub mod registry;
pub mod saver;
pub mod station;
pub mod store;
pub mod table;
pub mod telemetry;

pub use error::{Error, Result};
pub use history::{FinishedRun, RunHistory};
pub use launcher::RunLauncher;
pub use packet::RunPacket;
pub use pipeline::{Pipeline, PipelineOutcome, Step};
pub use registry::RunRegistry;
pub use station::{Station, StationOutcome};
pub use store::{FigureStore, KeyedStore, TableStore};
