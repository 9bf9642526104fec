//! Run packets
//!
//! A packet carries one run through the stations. Each stage is its own
//! type (see [`stages`]); [`RunPacket`] is the tagged union the pipeline
//! driver threads between stations.

pub mod proxy;
pub mod stages;

use std::fmt;

pub use proxy::{AdapterAccess, FigureAccess, LoggingDataAccess, MetadataAccess};
pub use stages::{InitializedRun, ProcessedRun, StartRun, VisualizedRun};

use crate::{Error, Result};

/// Names a [`RunPacket`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// [`StartRun`]
    Start,
    /// [`InitializedRun`]
    Initialized,
    /// [`ProcessedRun`]
    Processed,
    /// [`VisualizedRun`]
    Visualized,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "StartRun",
            Self::Initialized => "InitializedRun",
            Self::Processed => "ProcessedRun",
            Self::Visualized => "VisualizedRun",
        })
    }
}

/// A run at any live stage.
#[derive(Debug)]
pub enum RunPacket {
    /// Not yet initialized
    Start(StartRun),
    /// Metadata extracted
    Initialized(InitializedRun),
    /// Process executed
    Processed(ProcessedRun),
    /// Figures derived
    Visualized(VisualizedRun),
}

impl RunPacket {
    /// Which stage this packet is at.
    #[must_use]
    pub const fn kind(&self) -> PacketKind {
        match self {
            Self::Start(_) => PacketKind::Start,
            Self::Initialized(_) => PacketKind::Initialized,
            Self::Processed(_) => PacketKind::Processed,
            Self::Visualized(_) => PacketKind::Visualized,
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        match self {
            Self::Start(run) => run.run_id(),
            Self::Initialized(run) => run.run_id(),
            Self::Processed(run) => run.run_id(),
            Self::Visualized(run) => run.run_id(),
        }
    }

    fn mismatch(&self, station: &'static str, expected: PacketKind) -> Error {
        Error::InvalidPacketType {
            station,
            expected,
            found: self.kind(),
        }
    }

    /// Unwrap a [`StartRun`] for `station`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPacketType` for any other stage
    pub fn into_start(self, station: &'static str) -> Result<StartRun> {
        match self {
            Self::Start(run) => Ok(run),
            other => Err(other.mismatch(station, PacketKind::Start)),
        }
    }

    /// Unwrap an [`InitializedRun`] for `station`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPacketType` for any other stage
    pub fn into_initialized(self, station: &'static str) -> Result<InitializedRun> {
        match self {
            Self::Initialized(run) => Ok(run),
            other => Err(other.mismatch(station, PacketKind::Initialized)),
        }
    }

    /// Unwrap a [`ProcessedRun`] for `station`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPacketType` for any other stage
    pub fn into_processed(self, station: &'static str) -> Result<ProcessedRun> {
        match self {
            Self::Processed(run) => Ok(run),
            other => Err(other.mismatch(station, PacketKind::Processed)),
        }
    }

    /// Unwrap a [`VisualizedRun`] for `station`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPacketType` for any other stage
    pub fn into_visualized(self, station: &'static str) -> Result<VisualizedRun> {
        match self {
            Self::Visualized(run) => Ok(run),
            other => Err(other.mismatch(station, PacketKind::Visualized)),
        }
    }
}

impl From<StartRun> for RunPacket {
    fn from(run: StartRun) -> Self {
        Self::Start(run)
    }
}

impl From<InitializedRun> for RunPacket {
    fn from(run: InitializedRun) -> Self {
        Self::Initialized(run)
    }
}

impl From<ProcessedRun> for RunPacket {
    fn from(run: ProcessedRun) -> Self {
        Self::Processed(run)
    }
}

impl From<VisualizedRun> for RunPacket {
    fn from(run: VisualizedRun) -> Self {
        Self::Visualized(run)
    }
}
