//! Enumerated key axes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Phase of a process a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessPhase {
    /// Run initialization (metadata extraction)
    Initialization,
    /// Training phase
    Train,
    /// Validation phase
    Validation,
    /// Test phase
    Test,
}

impl ProcessPhase {
    /// Every phase, in pipeline order.
    pub const ALL: [Self; 4] = [Self::Initialization, Self::Train, Self::Validation, Self::Test];

    /// Lowercase name used in file names and log prefixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

/// Kind of process station invoked for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    /// Fit the model (emits train and validation logs)
    Train,
    /// Validate the model
    Validation,
    /// Test the model
    Test,
}

impl ProcessType {
    /// Every process type.
    pub const ALL: [Self; 3] = [Self::Train, Self::Validation, Self::Test];

    /// Lowercase name used in run ids and directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }

    /// Phases whose logs a process of this type produces.
    ///
    /// Fitting interleaves validation epochs, so `Train` covers both.
    #[must_use]
    pub const fn phases(self) -> &'static [ProcessPhase] {
        match self {
            Self::Train => &[ProcessPhase::Train, ProcessPhase::Validation],
            Self::Validation => &[ProcessPhase::Validation],
            Self::Test => &[ProcessPhase::Test],
        }
    }
}

impl FromStr for ProcessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|process| process.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "Unknown process type '{s}' (expected train, validation or test)"
                ))
            })
    }
}

/// Which producer emitted a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Data module adapter
    Module,
    /// Model adapter (model-side metric logging)
    Model,
    /// Trainer adapter (trainer-side metric logging)
    Trainer,
    /// Derived by a calculation station
    Calculator,
    /// Derived by the visualisation station
    Visualisation,
}

impl DataOrigin {
    /// Every origin.
    pub const ALL: [Self; 5] = [
        Self::Module,
        Self::Model,
        Self::Trainer,
        Self::Calculator,
        Self::Visualisation,
    ];

    /// Lowercase name used in file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Model => "model",
            Self::Trainer => "trainer",
            Self::Calculator => "calculator",
            Self::Visualisation => "visualisation",
        }
    }
}

/// Granularity of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractionLevel {
    /// One row per predicted instance
    Instance,
    /// One row per batch
    Batch,
    /// One row per epoch
    Epoch,
    /// Run-wide values
    General,
}

impl AbstractionLevel {
    /// Every abstraction level.
    pub const ALL: [Self; 4] = [Self::Instance, Self::Batch, Self::Epoch, Self::General];

    /// Lowercase name used in file names and log prefixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Batch => "batch",
            Self::Epoch => "epoch",
            Self::General => "general",
        }
    }
}

/// Identifier of a metric or figure kind.
///
/// The set is open: names without a dedicated variant round-trip through
/// [`Column::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Column {
    /// Free-form metrics description
    Metrics,
    /// Free-form parameter description
    Params,
    /// Maximum epoch count of a trainer
    MaxEpoch,
    /// Global optimizer step
    GlobalStep,
    /// Batch index within an epoch
    BatchIdx,
    /// Epoch index
    Epoch,
    /// Predicted value distribution
    PredictedDistribution,
    /// Target value distribution
    TargetDistribution,
    /// Target vs predicted density comparison
    DistributionComparison,
    /// Absolute error between target and prediction
    TotalError,
    /// Predicted value
    Predicted,
    /// Target value
    Target,
    /// Loss
    Loss,
    /// Accuracy
    Accuracy,
    /// Precision
    Precision,
    /// Recall
    Recall,
    /// Coefficient of determination
    R2,
    /// Mean squared error
    Mse,
    /// Mean absolute error
    Mae,
    /// Normalized mean squared error
    Nmse,
    /// Normalized root mean squared error
    Nrmse,
    /// F1 score
    F1,
    /// Area under the ROC curve
    RocAuc,
    /// Area under the precision-recall curve
    PrAuc,
    /// Any other metric name
    Other(String),
}

const NAMED_COLUMNS: [Column; 24] = [
    Column::Metrics,
    Column::Params,
    Column::MaxEpoch,
    Column::GlobalStep,
    Column::BatchIdx,
    Column::Epoch,
    Column::PredictedDistribution,
    Column::TargetDistribution,
    Column::DistributionComparison,
    Column::TotalError,
    Column::Predicted,
    Column::Target,
    Column::Loss,
    Column::Accuracy,
    Column::Precision,
    Column::Recall,
    Column::R2,
    Column::Mse,
    Column::Mae,
    Column::Nmse,
    Column::Nrmse,
    Column::F1,
    Column::RocAuc,
    Column::PrAuc,
];

impl Column {
    /// Column name as it appears in tables and file names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Metrics => "metrics",
            Self::Params => "params",
            Self::MaxEpoch => "max_epoch",
            Self::GlobalStep => "global_step",
            Self::BatchIdx => "batch_idx",
            Self::Epoch => "epoch",
            Self::PredictedDistribution => "predicted_distribution",
            Self::TargetDistribution => "target_distribution",
            Self::DistributionComparison => "distribution_comparison",
            Self::TotalError => "total_error",
            Self::Predicted => "predicted",
            Self::Target => "target",
            Self::Loss => "loss",
            Self::Accuracy => "accuracy",
            Self::Precision => "precision",
            Self::Recall => "recall",
            Self::R2 => "R2",
            Self::Mse => "mse",
            Self::Mae => "mae",
            Self::Nmse => "nmse",
            Self::Nrmse => "nrmse",
            Self::F1 => "f1",
            Self::RocAuc => "roc_auc",
            Self::PrAuc => "pr_auc",
            Self::Other(name) => name,
        }
    }

    /// Resolve a column name, falling back to [`Column::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        NAMED_COLUMNS
            .iter()
            .find(|column| column.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }

    /// Index columns hold integer counters rather than metric values.
    #[must_use]
    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Epoch | Self::GlobalStep | Self::BatchIdx)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        match column {
            Column::Other(name) => name,
            named => named.as_str().to_string(),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ProcessPhase, ProcessType, DataOrigin, AbstractionLevel, Column);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_type_from_str() {
        assert_eq!("train".parse::<ProcessType>().unwrap(), ProcessType::Train);
        assert_eq!("test".parse::<ProcessType>().unwrap(), ProcessType::Test);
        assert_eq!(
            "validation".parse::<ProcessType>().unwrap(),
            ProcessType::Validation
        );

        let err = "predict".parse::<ProcessType>().unwrap_err();
        assert!(err.to_string().contains("Unknown process type 'predict'"));
    }

    #[test]
    fn test_train_process_covers_validation_phase() {
        assert_eq!(
            ProcessType::Train.phases(),
            &[ProcessPhase::Train, ProcessPhase::Validation]
        );
        assert_eq!(ProcessType::Test.phases(), &[ProcessPhase::Test]);
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in &NAMED_COLUMNS {
            assert_eq!(&Column::from_name(column.as_str()), column);
        }
        assert_eq!(Column::from_name("R2"), Column::R2);
        assert_eq!(
            Column::from_name("lossA"),
            Column::Other("lossA".to_string())
        );
    }

    #[test]
    fn test_column_serializes_as_name() {
        let json = serde_json::to_string(&Column::Mae).unwrap();
        assert_eq!(json, "\"mae\"");

        let other: Column = serde_json::from_str("\"energy_error\"").unwrap();
        assert_eq!(other, Column::Other("energy_error".to_string()));
    }

    #[test]
    fn test_index_columns() {
        assert!(Column::Epoch.is_index());
        assert!(Column::GlobalStep.is_index());
        assert!(Column::BatchIdx.is_index());
        assert!(!Column::Loss.is_index());
    }

    #[test]
    fn test_display_matches_file_naming() {
        assert_eq!(DataOrigin::Visualisation.to_string(), "visualisation");
        assert_eq!(AbstractionLevel::Epoch.to_string(), "epoch");
        assert_eq!(ProcessPhase::Initialization.to_string(), "initialization");
    }
}
