//! Visualisation station: `ProcessedRun` → `VisualizedRun`

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{Station, StationOutcome};
use crate::figure::Figure;
use crate::keys::{AbstractionLevel, Column};
use crate::packet::{ProcessedRun, RunPacket, VisualizedRun};
use crate::store::FigureStore;
use crate::table::{column_values, columns};
use crate::Result;

/// Callback applied to every line figure before it is stored.
pub type FigureStyle = Arc<dyn Fn(&mut Figure) + Send + Sync>;

/// Plots every metric of every epoch-level table against the epoch index.
///
/// A table at [`AbstractionLevel::Epoch`] with columns `{epoch, a, b}`
/// yields two figures, keyed with the table's origin and phase and the
/// plotted column.
#[derive(Clone, Default)]
pub struct VisualisationStation {
    style: Option<FigureStyle>,
}

impl VisualisationStation {
    /// Station name.
    pub const NAME: &'static str = "visualisation";

    /// Create the station.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `style` to every generated figure.
    #[must_use]
    pub fn with_style<F>(mut self, style: F) -> Self
    where
        F: Fn(&mut Figure) + Send + Sync + 'static,
    {
        self.style = Some(Arc::new(style));
        self
    }

    /// Derive the figures of `run`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ColumnNotFound` if an epoch-level table has no `epoch` column
    pub fn visualize(&self, run: ProcessedRun) -> Result<VisualizedRun> {
        let mut figures = FigureStore::new();

        for key in run.tables().keys_at(AbstractionLevel::Epoch) {
            let table = run.table(&key)?;
            let epochs = column_values(table, &Column::Epoch)?;

            for column in columns(table) {
                if column == Column::Epoch {
                    continue;
                }
                let values = column_values(table, &column)?;
                let mut figure = Figure::line(
                    AbstractionLevel::Epoch.as_str(),
                    column.as_str(),
                    &epochs,
                    &values,
                );
                if let Some(style) = &self.style {
                    style(&mut figure);
                }
                figures.put(key.figure(column), figure);
            }
        }

        debug!(
            run_id = run.run_id(),
            figures = figures.len(),
            "Epoch figures derived"
        );
        Ok(run.into_visualized(figures))
    }
}

impl fmt::Debug for VisualisationStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualisationStation")
            .field("styled", &self.style.is_some())
            .finish()
    }
}

impl Station for VisualisationStation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        let run = packet.into_processed(Self::NAME)?;
        Ok(StationOutcome::Continue(self.visualize(run)?.into()))
    }
}
