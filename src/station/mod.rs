//! Pipeline stations
//!
//! ## State machine
//!
//! | From             | Station                 | To               |
//! |------------------|-------------------------|------------------|
//! | `StartRun`       | [`InitializingStation`] | `InitializedRun` |
//! | `InitializedRun` | [`ProcessStation`]      | `ProcessedRun`   |
//! | `ProcessedRun`   | [`VisualisationStation`]| `VisualizedRun`  |
//! | `VisualizedRun`  | [`StatisticCalculation`]| `VisualizedRun`  |
//! | `VisualizedRun`  | [`RunFinisher`]         | terminal         |
//!
//! Each station has a typed method for its edge plus the dynamic
//! [`Station::process`] the pipeline driver calls, which rejects any other
//! packet variant with `Error::InvalidPacketType`.

pub mod calculation;
pub mod finisher;
pub mod initializing;
pub mod process;
pub mod visualisation;

pub use calculation::{ErrorPhasePolicy, StatisticCalculation};
pub use finisher::RunFinisher;
pub use initializing::InitializingStation;
pub use process::ProcessStation;
pub use visualisation::{FigureStyle, VisualisationStation};

use crate::packet::RunPacket;
use crate::Result;

/// What a station hands back to the driver.
#[derive(Debug)]
pub enum StationOutcome {
    /// Pass this packet to the next station
    Continue(RunPacket),
    /// Stop the pipeline; remaining stations are not invoked
    Terminate,
}

/// One pipeline stage.
pub trait Station: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Transform `packet` into its successor or end the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPacketType` if `packet` is not the variant this
    /// station accepts, or any error raised while transforming it
    fn process(&self, packet: RunPacket) -> Result<StationOutcome>;
}
