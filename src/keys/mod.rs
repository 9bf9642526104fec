//! Composite keys of the run store
//!
//! ## Axes
//!
//! ```text
//! DataOrigin × AbstractionLevel × ProcessPhase           → TableKey
//! DataOrigin × AbstractionLevel × Column × ProcessPhase  → FigureKey
//!              AbstractionLevel × ProcessPhase           → AdapterKey (adapter-local only)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_pipeline::keys::{AbstractionLevel, AdapterKey, DataOrigin, ProcessPhase, TableKey};
//!
//! let local = AdapterKey::new(AbstractionLevel::Epoch, ProcessPhase::Train);
//! let key = local.with_origin(DataOrigin::Trainer);
//!
//! assert_eq!(
//!     key,
//!     TableKey::new(DataOrigin::Trainer, AbstractionLevel::Epoch, ProcessPhase::Train)
//! );
//! ```

mod axes;
mod composite;

pub use axes::{AbstractionLevel, Column, DataOrigin, ProcessPhase, ProcessType};
pub use composite::{AdapterKey, FigureKey, TableKey};
