//! Replay Run Example
//!
//! Re-processes a recorded SchNet training run through the full pipeline:
//! registry lookup, metadata extraction, log collection, epoch figures,
//! and persistence to a run directory.
//!
//! Run with: RUST_LOG=debug cargo run --example replay_run [output_dir]

use std::sync::Arc;

use anyhow::Context;
use trueno_pipeline::adapter::{ReplayModel, ReplayModule, ReplayTrainer};
use trueno_pipeline::config::{ModelConfig, ModuleConfig, TrainerConfig};
use trueno_pipeline::keys::{AbstractionLevel, AdapterKey, Column, ProcessPhase, ProcessType};
use trueno_pipeline::saver::{FsRunSaver, TableFormat};
use trueno_pipeline::station::RunFinisher;
use trueno_pipeline::table::MetricRow;
use trueno_pipeline::telemetry::init_tracing;
use trueno_pipeline::{RunLauncher, RunRegistry};

const EPOCHS: u32 = 5;
const STEPS_PER_EPOCH: u64 = 3;

#[allow(clippy::cast_precision_loss)]
fn recorded_trainer(config: TrainerConfig) -> ReplayTrainer {
    let mut trainer = ReplayTrainer::new("schnet_trainer", config);
    for index in 0..EPOCHS {
        let epoch = f64::from(index);
        let step = u64::from(index + 1) * STEPS_PER_EPOCH;
        let loss = 2.5 / (epoch + 1.0) + 0.1;

        trainer = trainer
            .with_metrics(
                ProcessPhase::Train,
                step,
                [
                    ("custom_train_epoch_loss", loss),
                    ("custom_train_epoch_mae", loss / 2.0),
                    ("epoch", epoch),
                ],
            )
            .with_metrics(
                ProcessPhase::Validation,
                step,
                [("custom_validation_epoch_loss", loss * 1.1), ("epoch", epoch)],
            );
        for batch in 0..STEPS_PER_EPOCH {
            trainer = trainer.with_metrics(
                ProcessPhase::Train,
                step - STEPS_PER_EPOCH + batch,
                [("custom_train_batch_loss", loss + 0.05 * batch as f64), ("epoch", epoch)],
            );
        }
    }
    trainer.with_metrics(ProcessPhase::Test, 0, [("custom_test_epoch_mae", 0.21)])
}

fn recorded_model(config: ModelConfig) -> ReplayModel {
    (0..EPOCHS).fold(ReplayModel::new("schnet", config), |model, index| {
        let epoch = f64::from(index);
        model.with_row(
            AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Validation),
            MetricRow::new()
                .with(Column::Epoch, epoch)
                .with(Column::R2, 0.6 + 0.07 * epoch),
        )
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let root = std::env::args()
        .nth(1)
        .map_or_else(|| std::env::temp_dir().join("trueno-pipeline-runs"), Into::into);
    println!("=== Trueno-Pipeline Replay Run ===\n");

    // -------------------------------------------------------------------------
    // 1. Register adapters
    // -------------------------------------------------------------------------
    let model_config = ModelConfig::builder(["total_energy"])
        .additional_input_key("forces")
        .learning_rate(5e-4)
        .build()?;
    let module_config = ModuleConfig::builder(["total_energy"]).batch_size(8).build()?;
    let trainer_config = TrainerConfig::builder(EPOCHS).log_every_n_steps(1).build()?;

    let registry = RunRegistry::new();
    registry.register_model(Arc::new(recorded_model(model_config)));
    registry.register_module(Arc::new(ReplayModule::new("qm9", module_config)));
    registry.register_trainer(Arc::new(recorded_trainer(trainer_config)));
    println!("1. Registered {:?}", registry);

    // -------------------------------------------------------------------------
    // 2. Launch a train run and a test run
    // -------------------------------------------------------------------------
    let finisher = RunFinisher::new(FsRunSaver::new(&root).with_format(TableFormat::Csv));
    let launcher = RunLauncher::new(Arc::new(registry), Arc::new(finisher));

    for process in [ProcessType::Train, ProcessType::Test] {
        let run = launcher
            .run_by_name("schnet", "qm9", "schnet_trainer", process)
            .with_context(|| format!("{process} run failed"))?;

        println!("\n2. Run {} ({process})", run.run_id());
        println!("   Tables:");
        for key in run.tables().sorted_keys() {
            println!("     {key}: {} rows", run.table(key)?.num_rows());
        }
        println!("   Figures: {}", run.figures().len());
        if let Some(location) = run.record().location() {
            println!("   Saved to: {}", location.display());
        }
    }

    // -------------------------------------------------------------------------
    // 3. History
    // -------------------------------------------------------------------------
    println!("\n3. History");
    for run in launcher.finisher().history().snapshot() {
        println!(
            "   {} [{:?}] started {:?}",
            run.run_id(),
            run.record().status(),
            run.record().started_at()
        );
    }

    Ok(())
}
