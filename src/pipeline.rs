//! Pipeline driver
//!
//! Threads one packet through an ordered queue of stations. Each station is
//! popped, invoked exactly once, and either hands back the next packet or
//! ends the run. Errors propagate immediately: nothing is retried and no
//! later station (in particular the finisher) runs.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, debug_span, info, info_span};

use crate::packet::RunPacket;
use crate::station::{Station, StationOutcome};
use crate::Result;

/// Result of a single [`Pipeline::step`].
#[derive(Debug)]
pub enum Step {
    /// A station produced this successor packet
    Advanced(RunPacket),
    /// The named station ended the pipeline
    Terminated {
        /// Station that signalled termination
        station: &'static str,
    },
    /// The queue was empty; the packet is handed back untouched
    Exhausted(RunPacket),
}

/// How a full [`Pipeline::run`] ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// A station signalled termination
    Terminated {
        /// Station that signalled termination
        station: &'static str,
        /// Stations invoked, including the terminating one
        stations_run: usize,
    },
    /// The queue ran out while a packet was still live
    ///
    /// `stations_run == 0` means the queue was already empty.
    Exhausted {
        /// The last packet produced
        packet: RunPacket,
        /// Stations invoked
        stations_run: usize,
    },
}

impl PipelineOutcome {
    /// Number of stations invoked.
    #[must_use]
    pub const fn stations_run(&self) -> usize {
        match self {
            Self::Terminated { stations_run, .. } | Self::Exhausted { stations_run, .. } => {
                *stations_run
            }
        }
    }

    /// Whether a station ended the run.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}

/// Ordered queue of stations for one run.
#[derive(Clone, Default)]
pub struct Pipeline {
    stations: VecDeque<Arc<dyn Station>>,
}

impl Pipeline {
    /// Create a pipeline from stations in execution order.
    #[must_use]
    pub fn new(stations: impl IntoIterator<Item = Arc<dyn Station>>) -> Self {
        Self {
            stations: stations.into_iter().collect(),
        }
    }

    /// Append a station.
    #[must_use]
    pub fn station(mut self, station: impl Station + 'static) -> Self {
        self.stations.push_back(Arc::new(station));
        self
    }

    /// Append a shared station.
    #[must_use]
    pub fn shared_station(mut self, station: Arc<dyn Station>) -> Self {
        self.stations.push_back(station);
        self
    }

    /// Number of stations still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stations.len()
    }

    /// Names of the queued stations, in order.
    #[must_use]
    pub fn station_names(&self) -> Vec<&'static str> {
        self.stations.iter().map(|station| station.name()).collect()
    }

    /// Pop the next station and run it on `packet`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the station
    pub fn step(&mut self, packet: RunPacket) -> Result<Step> {
        let Some(station) = self.stations.pop_front() else {
            return Ok(Step::Exhausted(packet));
        };

        let span = debug_span!("station", name = station.name());
        let _enter = span.enter();
        debug!(packet = %packet.kind(), "Station started");

        Ok(match station.process(packet)? {
            StationOutcome::Continue(next) => {
                debug!(packet = %next.kind(), "Station finished");
                Step::Advanced(next)
            }
            StationOutcome::Terminate => Step::Terminated {
                station: station.name(),
            },
        })
    }

    /// Drive `packet` through every queued station.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a station; later stations are not invoked
    pub fn run(mut self, packet: impl Into<RunPacket>) -> Result<PipelineOutcome> {
        let mut packet = packet.into();
        let span = info_span!("run", run_id = packet.run_id());
        let _enter = span.enter();

        let mut stations_run = 0;
        loop {
            if self.stations.is_empty() {
                if stations_run == 0 {
                    debug!("Pipeline invoked with no stations");
                }
                return Ok(PipelineOutcome::Exhausted {
                    packet,
                    stations_run,
                });
            }
            match self.step(packet)? {
                Step::Advanced(next) => {
                    stations_run += 1;
                    packet = next;
                }
                Step::Terminated { station } => {
                    stations_run += 1;
                    info!(station, stations_run, skipped = self.remaining(), "Pipeline terminated");
                    return Ok(PipelineOutcome::Terminated {
                        station,
                        stations_run,
                    });
                }
                Step::Exhausted(last) => {
                    return Ok(PipelineOutcome::Exhausted {
                        packet: last,
                        stations_run,
                    });
                }
            }
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stations", &self.station_names())
            .finish()
    }
}
