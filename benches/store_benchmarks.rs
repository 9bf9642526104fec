//! Result store benchmarks
//!
//! - Origin tagging of adapter logs (`tag_origin` + `union`)
//! - Epoch figure derivation (visualisation station)
//! - Metric row to Arrow table assembly

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_pipeline::adapter::{AdapterSet, ReplayModel, ReplayModule, ReplayTrainer};
use trueno_pipeline::config::{ModelConfig, ModuleConfig, TrainerConfig};
use trueno_pipeline::keys::{AbstractionLevel, AdapterKey, Column, DataOrigin, ProcessPhase, ProcessType};
use trueno_pipeline::packet::{MetadataAccess, StartRun};
use trueno_pipeline::station::VisualisationStation;
use trueno_pipeline::store::{tag_origin, AdapterLogs};
use trueno_pipeline::table::{text_row, MetricRow, Table, TableBuilder};

/// Epoch table with `epochs` rows and `metrics` metric columns
#[allow(clippy::cast_precision_loss)]
fn epoch_table(epochs: usize, metrics: usize) -> Table {
    (0..epochs)
        .map(|epoch| {
            (0..metrics).fold(
                MetricRow::new().with(Column::Epoch, epoch as f64),
                |row, metric| row.with(format!("metric_{metric}").as_str(), 1.0 / (epoch + metric + 1) as f64),
            )
        })
        .collect::<TableBuilder>()
        .build()
        .unwrap()
}

/// Adapter logs covering every (level, phase) pair
fn full_logs(epochs: usize) -> AdapterLogs {
    AbstractionLevel::ALL
        .into_iter()
        .flat_map(|level| ProcessPhase::ALL.into_iter().map(move |phase| AdapterKey::new(level, phase)))
        .map(|key| (key, epoch_table(epochs, 4)))
        .collect()
}

fn adapters() -> AdapterSet {
    AdapterSet::new(
        Arc::new(ReplayModel::new("m1", ModelConfig::builder(["energy"]).build().unwrap())),
        Arc::new(ReplayModule::new("d1", ModuleConfig::builder(["energy"]).build().unwrap())),
        Arc::new(ReplayTrainer::new("t1", TrainerConfig::builder(1).build().unwrap())),
    )
}

fn metadata() -> MetadataAccess {
    let table = text_row(vec![(Column::Params, "bench".to_string())]).unwrap();
    MetadataAccess::new(table.clone(), serde_json::Value::Null, table)
}

/// Benchmark origin tagging and merging of trainer and model logs
fn bench_origin_tagging(c: &mut Criterion) {
    let mut group = c.benchmark_group("origin_tagging");

    for epochs in [10, 100, 1_000].iter() {
        let trainer = full_logs(*epochs);
        let model = full_logs(*epochs);

        group.bench_with_input(BenchmarkId::from_parameter(epochs), epochs, |b, _| {
            b.iter(|| {
                let store = tag_origin(trainer.clone(), DataOrigin::Trainer)
                    .union(tag_origin(model.clone(), DataOrigin::Model));
                black_box(store);
            });
        });
    }

    group.finish();
}

/// Benchmark epoch figure derivation
fn bench_visualisation(c: &mut Criterion) {
    let mut group = c.benchmark_group("visualisation");
    let station = VisualisationStation::new();

    for metrics in [1, 8, 32].iter() {
        let tables = tag_origin(
            [(
                AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Train),
                epoch_table(200, *metrics),
            )]
            .into_iter()
            .collect(),
            DataOrigin::Trainer,
        );

        group.bench_with_input(BenchmarkId::from_parameter(metrics), metrics, |b, _| {
            b.iter(|| {
                let run = StartRun::new("m1_train_0", adapters())
                    .into_initialized(metadata())
                    .into_processed(ProcessType::Train, tables.clone());
                black_box(station.visualize(run).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark metric row buffering into Arrow tables
fn bench_table_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_assembly");

    for rows in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, rows| {
            b.iter(|| black_box(epoch_table(*rows, 4)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_origin_tagging,
    bench_visualisation,
    bench_table_assembly
);
criterion_main!(benches);
