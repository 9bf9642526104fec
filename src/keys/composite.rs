//! Composite keys
//!
//! Equality and hashing cover every field: two keys built from the same axis
//! values are the same key, any differing axis makes them distinct.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AbstractionLevel, Column, DataOrigin, ProcessPhase};

/// Key of an adapter's private log, before it is merged into a run store.
///
/// An `AdapterKey` never indexes the run store directly; it must first be
/// tagged with a [`DataOrigin`] via [`AdapterKey::with_origin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdapterKey {
    abstraction_level: AbstractionLevel,
    phase: ProcessPhase,
}

impl AdapterKey {
    /// Create a new adapter-local key.
    #[must_use]
    pub const fn new(abstraction_level: AbstractionLevel, phase: ProcessPhase) -> Self {
        Self {
            abstraction_level,
            phase,
        }
    }

    /// Get the abstraction level.
    #[must_use]
    pub const fn abstraction_level(&self) -> AbstractionLevel {
        self.abstraction_level
    }

    /// Get the process phase.
    #[must_use]
    pub const fn phase(&self) -> ProcessPhase {
        self.phase
    }

    /// Cross into the run store by injecting the producer's origin.
    #[must_use]
    pub const fn with_origin(self, origin: DataOrigin) -> TableKey {
        TableKey::new(origin, self.abstraction_level, self.phase)
    }
}

/// Key of one metric table in a run store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey {
    origin: DataOrigin,
    abstraction_level: AbstractionLevel,
    phase: ProcessPhase,
}

impl TableKey {
    /// Create a new table key.
    #[must_use]
    pub const fn new(
        origin: DataOrigin,
        abstraction_level: AbstractionLevel,
        phase: ProcessPhase,
    ) -> Self {
        Self {
            origin,
            abstraction_level,
            phase,
        }
    }

    /// Get the data origin.
    #[must_use]
    pub const fn origin(&self) -> DataOrigin {
        self.origin
    }

    /// Get the abstraction level.
    #[must_use]
    pub const fn abstraction_level(&self) -> AbstractionLevel {
        self.abstraction_level
    }

    /// Get the process phase.
    #[must_use]
    pub const fn phase(&self) -> ProcessPhase {
        self.phase
    }

    /// Key of the figure derived from `column` of this table.
    #[must_use]
    pub const fn figure(self, column: Column) -> FigureKey {
        FigureKey::new(self.origin, self.abstraction_level, column, self.phase)
    }
}

/// Key of one figure in a run store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FigureKey {
    origin: DataOrigin,
    abstraction_level: AbstractionLevel,
    column: Column,
    phase: ProcessPhase,
}

impl FigureKey {
    /// Create a new figure key.
    #[must_use]
    pub const fn new(
        origin: DataOrigin,
        abstraction_level: AbstractionLevel,
        column: Column,
        phase: ProcessPhase,
    ) -> Self {
        Self {
            origin,
            abstraction_level,
            column,
            phase,
        }
    }

    /// Get the data origin.
    #[must_use]
    pub const fn origin(&self) -> DataOrigin {
        self.origin
    }

    /// Get the abstraction level.
    #[must_use]
    pub const fn abstraction_level(&self) -> AbstractionLevel {
        self.abstraction_level
    }

    /// Get the plotted column.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.column
    }

    /// Get the process phase.
    #[must_use]
    pub const fn phase(&self) -> ProcessPhase {
        self.phase
    }
}

impl fmt::Display for AdapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdapterKey({}, {})", self.abstraction_level, self.phase)
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TableKey({}, {}, {})",
            self.origin, self.abstraction_level, self.phase
        )
    }
}

impl fmt::Display for FigureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FigureKey({}, {}, {}, {})",
            self.origin, self.abstraction_level, self.column, self.phase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_table_key_structural_equality() {
        let a = TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train);
        let b = TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let other_phase =
            TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Test);
        assert_ne!(a, other_phase);
    }

    #[test]
    fn test_with_origin_keeps_axes() {
        let key = AdapterKey::new(AbstractionLevel::Batch, ProcessPhase::Validation);
        let table_key = key.with_origin(DataOrigin::Trainer);

        assert_eq!(table_key.origin(), DataOrigin::Trainer);
        assert_eq!(table_key.abstraction_level(), AbstractionLevel::Batch);
        assert_eq!(table_key.phase(), ProcessPhase::Validation);
    }

    #[test]
    fn test_figure_key_from_table_key() {
        let table_key =
            TableKey::new(DataOrigin::Model, AbstractionLevel::Epoch, ProcessPhase::Train);
        let figure_key = table_key.figure(Column::Loss);

        assert_eq!(figure_key.origin(), DataOrigin::Model);
        assert_eq!(figure_key.column(), &Column::Loss);
        assert_ne!(figure_key, table_key.figure(Column::Mae));
    }

    #[test]
    fn test_display() {
        let key = TableKey::new(
            DataOrigin::Calculator,
            AbstractionLevel::Instance,
            ProcessPhase::Validation,
        );
        assert_eq!(
            key.to_string(),
            "TableKey(calculator, instance, validation)"
        );
    }
}
