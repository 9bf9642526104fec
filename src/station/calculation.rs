//! Calculation station: `VisualizedRun` → `VisualizedRun`

use tracing::debug;

use super::{Station, StationOutcome};
use crate::figure::Figure;
use crate::keys::{AbstractionLevel, Column, DataOrigin, FigureKey, ProcessPhase, TableKey};
use crate::packet::{RunPacket, VisualizedRun};
use crate::table::{column_values, float_column, Table};
use crate::Result;

/// Title of the target/prediction density figure.
pub const DISTRIBUTION_TITLE: &str = "Density Plot of True and Predicted Values";

/// Phase under which a derived error table is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPhasePolicy {
    /// Always [`ProcessPhase::Validation`], whatever the source phase
    #[default]
    Validation,
    /// The phase of the source table
    Source,
}

impl ErrorPhasePolicy {
    const fn phase_for(self, source: ProcessPhase) -> ProcessPhase {
        match self {
            Self::Validation => ProcessPhase::Validation,
            Self::Source => source,
        }
    }
}

/// Per-instance error statistics.
///
/// For every phase with a table at `(calculator, instance, phase)`, stores
/// `total_error = |target - predicted|` as a new instance table and adds a
/// density comparison of targets and predictions keyed by the source phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticCalculation {
    policy: ErrorPhasePolicy,
}

impl StatisticCalculation {
    /// Station name.
    pub const NAME: &'static str = "statistic_calculation";

    /// Create the station with the default phase policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the station with an explicit phase policy.
    #[must_use]
    pub const fn with_policy(policy: ErrorPhasePolicy) -> Self {
        Self { policy }
    }

    /// Get the phase policy.
    #[must_use]
    pub const fn policy(&self) -> ErrorPhasePolicy {
        self.policy
    }

    /// Key of the instance table read for `phase`.
    #[must_use]
    pub const fn source_key(phase: ProcessPhase) -> TableKey {
        TableKey::new(DataOrigin::Calculator, AbstractionLevel::Instance, phase)
    }

    /// Derive the statistics of `run`.
    ///
    /// Every source table is read before anything is written, so an error
    /// table stored under a source key does not feed a later phase.
    ///
    /// # Errors
    ///
    /// Returns `Error::ColumnNotFound` if a source table lacks `target` or `predicted`
    pub fn calculate(&self, mut run: VisualizedRun) -> Result<VisualizedRun> {
        let mut derived = Vec::new();

        for phase in ProcessPhase::ALL {
            let Some(source) = run.tables().try_get(&Self::source_key(phase)) else {
                continue;
            };
            derived.push((phase, Self::total_error(source)?, Self::distribution(source)?));
        }

        for (phase, error_table, figure) in derived {
            run.add_table(Self::source_key(self.policy.phase_for(phase)), error_table);
            run.add_figure(
                FigureKey::new(
                    DataOrigin::Calculator,
                    AbstractionLevel::Instance,
                    Column::DistributionComparison,
                    phase,
                ),
                figure,
            );
            debug!(run_id = run.run_id(), phase = %phase, "Instance statistics derived");
        }

        Ok(run)
    }

    fn total_error(source: &Table) -> Result<Table> {
        let targets = column_values(source, &Column::Target)?;
        let predictions = column_values(source, &Column::Predicted)?;
        let errors = targets
            .iter()
            .zip(&predictions)
            .map(|(target, predicted)| Some((target.as_ref()? - predicted.as_ref()?).abs()))
            .collect();
        float_column(Column::TotalError, errors)
    }

    fn distribution(source: &Table) -> Result<Figure> {
        let targets: Vec<f64> = column_values(source, &Column::Target)?
            .into_iter()
            .flatten()
            .collect();
        let predictions: Vec<f64> = column_values(source, &Column::Predicted)?
            .into_iter()
            .flatten()
            .collect();
        Ok(Figure::density_comparison(
            DISTRIBUTION_TITLE,
            &[
                ("True Values", targets.as_slice()),
                ("Predicted Values", predictions.as_slice()),
            ],
        ))
    }
}

impl Station for StatisticCalculation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        let run = packet.into_visualized(Self::NAME)?;
        Ok(StationOutcome::Continue(self.calculate(run)?.into()))
    }
}
