//! Error types for trueno-pipeline
//!
//! Every failure aborts the run it happens in: no station catches or retries,
//! and the finisher is never reached after an error.

use crate::adapter::AdapterKind;
use crate::keys::ProcessType;
use crate::packet::PacketKind;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Lookup of an absent key in a result store (always a logic error)
    #[error("Key not found in result store: {0}")]
    KeyNotFound(String),

    /// A table does not carry the requested column
    #[error("Column '{column}' not found in table (available: {available})")]
    ColumnNotFound {
        /// Requested column name
        column: String,
        /// Comma separated list of the table's columns
        available: String,
    },

    /// Run started with a name that was never registered
    #[error("No {kind} adapter registered under name '{name}'\nRegister it with RunRegistry::register_{kind}() first")]
    AdapterNotFound {
        /// Which registry map was searched
        kind: AdapterKind,
        /// The name that failed to resolve
        name: String,
    },

    /// A station received a packet variant it does not accept
    #[error("Station '{station}' expected a {expected} packet, got {found}\nStations must run in pipeline order")]
    InvalidPacketType {
        /// Station that rejected the packet
        station: &'static str,
        /// Packet variant the station accepts
        expected: PacketKind,
        /// Packet variant it actually received
        found: PacketKind,
    },

    /// Adapter configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The trainer adapter cannot execute this process type
    #[error("Process type '{0}' is not supported by this trainer")]
    UnsupportedProcess(ProcessType),

    /// An external adapter (model, module or trainer) failed
    #[error("Adapter '{adapter}' failed: {source}")]
    Adapter {
        /// Name of the failing adapter
        adapter: String,
        /// Underlying failure reported by the collaborator
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Persistence error (run directories, table and figure files)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a failure raised by an external adapter.
    pub fn adapter(
        adapter: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Adapter {
            adapter: adapter.into(),
            source: source.into(),
        }
    }
}
