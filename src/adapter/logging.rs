//! Metric log recorders
//!
//! Adapters buffer logged rows per [`AdapterKey`] and hand them over as
//! tables once a process finishes. Two recorders are provided:
//! - [`MetricLog`]: rows are recorded against an explicit key
//! - [`PrefixedMetricLog`]: flat metric maps whose names carry the key as a
//!   `custom_{phase}_{abstraction}_` prefix

use std::mem;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::keys::{AbstractionLevel, AdapterKey, Column, ProcessPhase};
use crate::store::AdapterLogs;
use crate::table::{MetricRow, Table, TableBuilder};
use crate::Result;

/// Name of the epoch entry in a flat metric map.
pub const EPOCH_METRIC: &str = "epoch";

/// Epoch recorded when a metric map carries no epoch entry.
pub const MISSING_EPOCH: i64 = -1;

/// Metric name of `column` logged at `level` during `phase`.
///
/// ```rust
/// use trueno_pipeline::adapter::prefixed_metric_name;
/// use trueno_pipeline::keys::{AbstractionLevel, Column, ProcessPhase};
///
/// assert_eq!(
///     prefixed_metric_name(ProcessPhase::Train, AbstractionLevel::Epoch, &Column::Loss),
///     "custom_train_epoch_loss"
/// );
/// ```
#[must_use]
pub fn prefixed_metric_name(phase: ProcessPhase, level: AbstractionLevel, column: &Column) -> String {
    format!("{}{column}", metric_prefix(phase, level))
}

fn metric_prefix(phase: ProcessPhase, level: AbstractionLevel) -> String {
    format!("custom_{phase}_{level}_")
}

/// Row buffer keyed by [`AdapterKey`].
#[derive(Debug, Default, Clone)]
pub struct MetricLog {
    rows: FxHashMap<AdapterKey, Vec<MetricRow>>,
}

impl MetricLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row under `key`.
    pub fn record(&mut self, key: AdapterKey, row: MetricRow) {
        self.rows.entry(key).or_default().push(row);
    }

    /// Append a row under `key` with its `global_step` and `epoch` counters.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_with_progress(
        &mut self,
        key: AdapterKey,
        mut row: MetricRow,
        global_step: u64,
        epoch: i64,
    ) {
        row.set(Column::GlobalStep, global_step as f64);
        row.set(Column::Epoch, epoch as f64);
        self.record(key, row);
    }

    /// Number of buffered rows across all keys.
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// Check if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert every key's rows into one table and reset the buffer.
    ///
    /// # Errors
    ///
    /// Returns error if a table cannot be assembled
    pub fn take_logs(&mut self) -> Result<AdapterLogs> {
        mem::take(&mut self.rows)
            .into_iter()
            .map(|(key, rows)| -> Result<(AdapterKey, Table)> {
                Ok((key, rows.into_iter().collect::<TableBuilder>().build()?))
            })
            .collect()
    }
}

/// Recorder for flat, prefix-named metric maps.
///
/// For every `(phase, abstraction)` prefix present in a map, one row is
/// recorded with the prefix stripped from the metric names, plus the
/// `global_step` and `epoch` counters.
#[derive(Debug, Default, Clone)]
pub struct PrefixedMetricLog {
    log: MetricLog,
    hparams: Vec<Value>,
    last_logs: Option<AdapterLogs>,
    last_hparams: Vec<Value>,
}

impl PrefixedMetricLog {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one flat metric map logged at `step`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn log_metrics<S: AsRef<str>>(&mut self, metrics: &[(S, f64)], step: u64) {
        let epoch = metrics
            .iter()
            .find(|(name, _)| name.as_ref() == EPOCH_METRIC)
            .map_or(MISSING_EPOCH, |(_, value)| *value as i64);

        for phase in ProcessPhase::ALL {
            for level in AbstractionLevel::ALL {
                let prefix = metric_prefix(phase, level);
                let row: MetricRow = metrics
                    .iter()
                    .filter_map(|(name, value)| {
                        name.as_ref()
                            .strip_prefix(&prefix)
                            .map(|column| (column, *value))
                    })
                    .collect();

                if !row.is_empty() {
                    self.log
                        .record_with_progress(AdapterKey::new(level, phase), row, step, epoch);
                }
            }
        }
    }

    /// Collect a hyperparameter map.
    pub fn log_hyperparams(&mut self, params: Value) {
        self.hparams.push(params);
    }

    /// Move buffered rows and hyperparameters into the "last" slots.
    ///
    /// # Errors
    ///
    /// Returns error if a table cannot be assembled
    pub fn finalize(&mut self) -> Result<()> {
        self.last_logs = Some(self.log.take_logs()?);
        self.last_hparams = mem::take(&mut self.hparams);
        Ok(())
    }

    /// Logs moved by the last [`finalize`](Self::finalize).
    #[must_use]
    pub const fn last_logs(&self) -> Option<&AdapterLogs> {
        self.last_logs.as_ref()
    }

    /// Hyperparameters moved by the last [`finalize`](Self::finalize).
    #[must_use]
    pub fn last_hparams(&self) -> &[Value] {
        &self.last_hparams
    }

    /// Number of rows not yet finalized.
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.log.pending_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{column_values, columns};
    use serde_json::json;

    #[test]
    fn test_take_logs_resets() {
        let key = AdapterKey::new(AbstractionLevel::Batch, ProcessPhase::Train);
        let mut log = MetricLog::new();
        log.record_with_progress(key, MetricRow::new().with(Column::Mae, 0.5), 10, 0);
        log.record_with_progress(key, MetricRow::new().with(Column::Mae, 0.4), 11, 0);
        assert_eq!(log.pending_rows(), 2);

        let logs = log.take_logs().unwrap();
        assert!(log.is_empty());

        let table = &logs[&key];
        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            columns(table),
            vec![Column::Mae, Column::GlobalStep, Column::Epoch]
        );
        assert_eq!(
            column_values(table, &Column::GlobalStep).unwrap(),
            vec![Some(10.0), Some(11.0)]
        );

        assert!(log.take_logs().unwrap().is_empty());
    }

    #[test]
    fn test_prefixed_metrics_split_by_prefix() {
        let mut log = PrefixedMetricLog::new();
        log.log_metrics(
            &[
                ("custom_train_epoch_loss", 0.9),
                ("custom_train_epoch_mae", 0.3),
                ("custom_validation_epoch_loss", 1.1),
                ("epoch", 2.0),
                ("lr", 0.01),
            ],
            40,
        );
        log.finalize().unwrap();

        let logs = log.last_logs().unwrap();
        assert_eq!(logs.len(), 2);

        let train = &logs[&AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Train)];
        assert_eq!(
            columns(train),
            vec![Column::Loss, Column::Mae, Column::GlobalStep, Column::Epoch]
        );
        assert_eq!(column_values(train, &Column::Epoch).unwrap(), vec![Some(2.0)]);

        let validation =
            &logs[&AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Validation)];
        assert_eq!(
            column_values(validation, &Column::Loss).unwrap(),
            vec![Some(1.1)]
        );
    }

    #[test]
    fn test_missing_epoch_recorded_as_minus_one() {
        let mut log = PrefixedMetricLog::new();
        log.log_metrics(&[("custom_test_batch_mae", 0.2)], 3);
        log.finalize().unwrap();

        let table = &log.last_logs().unwrap()
            [&AdapterKey::new(AbstractionLevel::Batch, ProcessPhase::Test)];
        assert_eq!(column_values(table, &Column::Epoch).unwrap(), vec![Some(-1.0)]);
    }

    #[test]
    fn test_finalize_moves_hparams() {
        let mut log = PrefixedMetricLog::new();
        log.log_hyperparams(json!({"max_epochs": 3}));
        assert!(log.last_logs().is_none());

        log.finalize().unwrap();
        assert_eq!(log.last_hparams(), &[json!({"max_epochs": 3})]);
        assert!(log.last_logs().unwrap().is_empty());

        log.finalize().unwrap();
        assert!(log.last_hparams().is_empty());
    }

    #[test]
    fn test_unprefixed_metrics_ignored() {
        let mut log = PrefixedMetricLog::new();
        log.log_metrics(&[("loss", 1.0), ("epoch", 0.0)], 0);
        assert_eq!(log.pending_rows(), 0);
    }
}
