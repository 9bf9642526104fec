//! Typed adapter configuration
//!
//! Each adapter kind has a closed set of named, typed settings, checked when
//! the config is built or deserialized. An invalid config cannot be constructed.
//!
//! ## Example
//!
//! ```rust
//! use trueno_pipeline::config::TrainerConfig;
//!
//! let config = TrainerConfig::builder(2).log_every_n_steps(1).build()?;
//! assert_eq!(config.max_epochs(), 2);
//!
//! assert!(TrainerConfig::builder(0).build().is_err());
//! # Ok::<(), trueno_pipeline::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_LOG_EVERY_N_STEPS: u32 = 50;
const DEFAULT_ATOM_BASIS_SIZE: u32 = 30;
const DEFAULT_NUM_INTERACTIONS: u32 = 3;
const DEFAULT_RBF_BASIS_SIZE: u32 = 20;
const DEFAULT_CUTOFF: f64 = 5.0;
const DEFAULT_LEARNING_RATE: f64 = 5e-4;
const DEFAULT_BATCH_SIZE: u32 = 2;
const DEFAULT_NUM_TRAIN: u32 = 6;
const DEFAULT_NUM_VAL: u32 = 4;
const DEFAULT_NUM_WORKERS: u32 = 4;

fn at_least_one(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidConfig(format!("{field} must be at least 1")));
    }
    Ok(())
}

fn positive_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{field} must be a positive finite number, got {value}"
        )));
    }
    Ok(())
}

/// Training loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrainerConfig")]
pub struct TrainerConfig {
    max_epochs: u32,
    min_epochs: Option<u32>,
    limit_train_batches: Option<u32>,
    limit_val_batches: Option<u32>,
    limit_test_batches: Option<u32>,
    log_every_n_steps: u32,
}

impl TrainerConfig {
    /// Create a builder with the required epoch budget.
    #[must_use]
    pub const fn builder(max_epochs: u32) -> TrainerConfigBuilder {
        TrainerConfigBuilder::new(max_epochs)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - `max_epochs` or `log_every_n_steps` is zero
    /// - `min_epochs` exceeds `max_epochs`
    /// - a batch limit is zero
    pub fn validate(&self) -> Result<()> {
        at_least_one("max_epochs", self.max_epochs)?;
        at_least_one("log_every_n_steps", self.log_every_n_steps)?;
        if let Some(min_epochs) = self.min_epochs {
            if min_epochs > self.max_epochs {
                return Err(Error::InvalidConfig(format!(
                    "min_epochs ({min_epochs}) exceeds max_epochs ({})",
                    self.max_epochs
                )));
            }
        }
        for (field, limit) in [
            ("limit_train_batches", self.limit_train_batches),
            ("limit_val_batches", self.limit_val_batches),
            ("limit_test_batches", self.limit_test_batches),
        ] {
            if let Some(limit) = limit {
                at_least_one(field, limit)?;
            }
        }
        Ok(())
    }

    /// Get the maximum number of epochs.
    #[must_use]
    pub const fn max_epochs(&self) -> u32 {
        self.max_epochs
    }

    /// Get the minimum number of epochs, if set.
    #[must_use]
    pub const fn min_epochs(&self) -> Option<u32> {
        self.min_epochs
    }

    /// Get the train batch limit, if set.
    #[must_use]
    pub const fn limit_train_batches(&self) -> Option<u32> {
        self.limit_train_batches
    }

    /// Get the validation batch limit, if set.
    #[must_use]
    pub const fn limit_val_batches(&self) -> Option<u32> {
        self.limit_val_batches
    }

    /// Get the test batch limit, if set.
    #[must_use]
    pub const fn limit_test_batches(&self) -> Option<u32> {
        self.limit_test_batches
    }

    /// Get the logging interval in steps.
    #[must_use]
    pub const fn log_every_n_steps(&self) -> u32 {
        self.log_every_n_steps
    }
}

/// Builder for `TrainerConfig`.
#[derive(Debug)]
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub const fn new(max_epochs: u32) -> Self {
        Self {
            config: TrainerConfig {
                max_epochs,
                min_epochs: None,
                limit_train_batches: None,
                limit_val_batches: None,
                limit_test_batches: None,
                log_every_n_steps: DEFAULT_LOG_EVERY_N_STEPS,
            },
        }
    }

    /// Set the minimum number of epochs.
    #[must_use]
    pub const fn min_epochs(mut self, epochs: u32) -> Self {
        self.config.min_epochs = Some(epochs);
        self
    }

    /// Limit the number of train batches per epoch.
    #[must_use]
    pub const fn limit_train_batches(mut self, batches: u32) -> Self {
        self.config.limit_train_batches = Some(batches);
        self
    }

    /// Limit the number of validation batches per epoch.
    #[must_use]
    pub const fn limit_val_batches(mut self, batches: u32) -> Self {
        self.config.limit_val_batches = Some(batches);
        self
    }

    /// Limit the number of test batches.
    #[must_use]
    pub const fn limit_test_batches(mut self, batches: u32) -> Self {
        self.config.limit_test_batches = Some(batches);
        self
    }

    /// Set the logging interval in steps.
    #[must_use]
    pub const fn log_every_n_steps(mut self, steps: u32) -> Self {
        self.config.log_every_n_steps = steps;
        self
    }

    /// Build the `TrainerConfig`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if validation fails
    pub fn build(self) -> Result<TrainerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Model architecture and optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelConfig")]
pub struct ModelConfig {
    prediction_keys: Vec<String>,
    additional_input_keys: Vec<String>,
    atom_basis_size: u32,
    num_interactions: u32,
    rbf_basis_size: u32,
    cutoff: f64,
    learning_rate: f64,
}

impl ModelConfig {
    /// Create a builder predicting `prediction_keys`.
    #[must_use]
    pub fn builder<I, S>(prediction_keys: I) -> ModelConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModelConfigBuilder::new(prediction_keys)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - `prediction_keys` is empty
    /// - a basis size or the interaction count is zero
    /// - `cutoff` or `learning_rate` is not a positive finite number
    pub fn validate(&self) -> Result<()> {
        if self.prediction_keys.is_empty() {
            return Err(Error::InvalidConfig(
                "prediction_keys must name at least one property".to_string(),
            ));
        }
        at_least_one("atom_basis_size", self.atom_basis_size)?;
        at_least_one("num_interactions", self.num_interactions)?;
        at_least_one("rbf_basis_size", self.rbf_basis_size)?;
        positive_finite("cutoff", self.cutoff)?;
        positive_finite("learning_rate", self.learning_rate)
    }

    /// Get the predicted properties.
    #[must_use]
    pub fn prediction_keys(&self) -> &[String] {
        &self.prediction_keys
    }

    /// Get the extra input properties.
    #[must_use]
    pub fn additional_input_keys(&self) -> &[String] {
        &self.additional_input_keys
    }

    /// Get the atom embedding size.
    #[must_use]
    pub const fn atom_basis_size(&self) -> u32 {
        self.atom_basis_size
    }

    /// Get the number of interaction blocks.
    #[must_use]
    pub const fn num_interactions(&self) -> u32 {
        self.num_interactions
    }

    /// Get the radial basis size.
    #[must_use]
    pub const fn rbf_basis_size(&self) -> u32 {
        self.rbf_basis_size
    }

    /// Get the neighbor cutoff radius.
    #[must_use]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Get the optimizer learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Optimizer description for metadata snapshots.
    #[must_use]
    pub fn optimizer_summary(&self) -> String {
        format!("AdamW(lr={})", self.learning_rate)
    }

    /// Architecture description for metadata snapshots.
    #[must_use]
    pub fn architecture_summary(&self) -> String {
        format!(
            "SchNet(n_atom_basis={}, n_interactions={}, n_rbf={}, cutoff={}, predict=[{}], inputs=[{}])",
            self.atom_basis_size,
            self.num_interactions,
            self.rbf_basis_size,
            self.cutoff,
            self.prediction_keys.join(", "),
            self.additional_input_keys.join(", "),
        )
    }
}

/// Builder for `ModelConfig`.
#[derive(Debug)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new<I, S>(prediction_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: ModelConfig {
                prediction_keys: prediction_keys.into_iter().map(Into::into).collect(),
                additional_input_keys: Vec::new(),
                atom_basis_size: DEFAULT_ATOM_BASIS_SIZE,
                num_interactions: DEFAULT_NUM_INTERACTIONS,
                rbf_basis_size: DEFAULT_RBF_BASIS_SIZE,
                cutoff: DEFAULT_CUTOFF,
                learning_rate: DEFAULT_LEARNING_RATE,
            },
        }
    }

    /// Add an extra input property.
    #[must_use]
    pub fn additional_input_key(mut self, key: impl Into<String>) -> Self {
        self.config.additional_input_keys.push(key.into());
        self
    }

    /// Set the atom embedding size.
    #[must_use]
    pub fn atom_basis_size(mut self, size: u32) -> Self {
        self.config.atom_basis_size = size;
        self
    }

    /// Set the number of interaction blocks.
    #[must_use]
    pub fn num_interactions(mut self, count: u32) -> Self {
        self.config.num_interactions = count;
        self
    }

    /// Set the radial basis size.
    #[must_use]
    pub fn rbf_basis_size(mut self, size: u32) -> Self {
        self.config.rbf_basis_size = size;
        self
    }

    /// Set the neighbor cutoff radius.
    #[must_use]
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.config.cutoff = cutoff;
        self
    }

    /// Set the optimizer learning rate.
    #[must_use]
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    /// Build the `ModelConfig`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if validation fails
    pub fn build(self) -> Result<ModelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Dataset loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawModuleConfig")]
pub struct ModuleConfig {
    selected_properties: Vec<String>,
    batch_size: u32,
    num_train: u32,
    num_val: u32,
    num_workers: u32,
    pin_memory: bool,
}

impl ModuleConfig {
    /// Create a builder loading `selected_properties`.
    #[must_use]
    pub fn builder<I, S>(selected_properties: I) -> ModuleConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModuleConfigBuilder::new(selected_properties)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - `selected_properties` is empty
    /// - `batch_size` or `num_train` is zero
    pub fn validate(&self) -> Result<()> {
        if self.selected_properties.is_empty() {
            return Err(Error::InvalidConfig(
                "selected_properties must name at least one property".to_string(),
            ));
        }
        at_least_one("batch_size", self.batch_size)?;
        at_least_one("num_train", self.num_train)
    }

    /// Get the loaded properties.
    #[must_use]
    pub fn selected_properties(&self) -> &[String] {
        &self.selected_properties
    }

    /// Get the batch size.
    #[must_use]
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Get the number of training samples.
    #[must_use]
    pub fn num_train(&self) -> u32 {
        self.num_train
    }

    /// Get the number of validation samples.
    #[must_use]
    pub fn num_val(&self) -> u32 {
        self.num_val
    }

    /// Get the number of loader workers.
    #[must_use]
    pub fn num_workers(&self) -> u32 {
        self.num_workers
    }

    /// Whether loaded batches are pinned in host memory.
    #[must_use]
    pub fn pin_memory(&self) -> bool {
        self.pin_memory
    }
}

/// Builder for `ModuleConfig`.
#[derive(Debug)]
pub struct ModuleConfigBuilder {
    config: ModuleConfig,
}

impl ModuleConfigBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new<I, S>(selected_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: ModuleConfig {
                selected_properties: selected_properties.into_iter().map(Into::into).collect(),
                batch_size: DEFAULT_BATCH_SIZE,
                num_train: DEFAULT_NUM_TRAIN,
                num_val: DEFAULT_NUM_VAL,
                num_workers: DEFAULT_NUM_WORKERS,
                pin_memory: true,
            },
        }
    }

    /// Set the batch size.
    #[must_use]
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the number of training samples.
    #[must_use]
    pub fn num_train(mut self, num_train: u32) -> Self {
        self.config.num_train = num_train;
        self
    }

    /// Set the number of validation samples.
    #[must_use]
    pub fn num_val(mut self, num_val: u32) -> Self {
        self.config.num_val = num_val;
        self
    }

    /// Set the number of loader workers.
    #[must_use]
    pub fn num_workers(mut self, num_workers: u32) -> Self {
        self.config.num_workers = num_workers;
        self
    }

    /// Pin loaded batches in host memory.
    #[must_use]
    pub fn pin_memory(mut self, pin_memory: bool) -> Self {
        self.config.pin_memory = pin_memory;
        self
    }

    /// Build the `ModuleConfig`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if validation fails
    pub fn build(self) -> Result<ModuleConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// Unvalidated wire forms; deserialization goes through `TryFrom` and `validate`.

#[derive(Deserialize)]
struct RawTrainerConfig {
    max_epochs: u32,
    #[serde(default)]
    min_epochs: Option<u32>,
    #[serde(default)]
    limit_train_batches: Option<u32>,
    #[serde(default)]
    limit_val_batches: Option<u32>,
    #[serde(default)]
    limit_test_batches: Option<u32>,
    log_every_n_steps: u32,
}

impl TryFrom<RawTrainerConfig> for TrainerConfig {
    type Error = Error;

    fn try_from(raw: RawTrainerConfig) -> Result<Self> {
        let config = Self {
            max_epochs: raw.max_epochs,
            min_epochs: raw.min_epochs,
            limit_train_batches: raw.limit_train_batches,
            limit_val_batches: raw.limit_val_batches,
            limit_test_batches: raw.limit_test_batches,
            log_every_n_steps: raw.log_every_n_steps,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize)]
struct RawModelConfig {
    prediction_keys: Vec<String>,
    #[serde(default)]
    additional_input_keys: Vec<String>,
    atom_basis_size: u32,
    num_interactions: u32,
    rbf_basis_size: u32,
    cutoff: f64,
    learning_rate: f64,
}

impl TryFrom<RawModelConfig> for ModelConfig {
    type Error = Error;

    fn try_from(raw: RawModelConfig) -> Result<Self> {
        let config = Self {
            prediction_keys: raw.prediction_keys,
            additional_input_keys: raw.additional_input_keys,
            atom_basis_size: raw.atom_basis_size,
            num_interactions: raw.num_interactions,
            rbf_basis_size: raw.rbf_basis_size,
            cutoff: raw.cutoff,
            learning_rate: raw.learning_rate,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize)]
struct RawModuleConfig {
    selected_properties: Vec<String>,
    batch_size: u32,
    num_train: u32,
    num_val: u32,
    num_workers: u32,
    pin_memory: bool,
}

impl TryFrom<RawModuleConfig> for ModuleConfig {
    type Error = Error;

    fn try_from(raw: RawModuleConfig) -> Result<Self> {
        let config = Self {
            selected_properties: raw.selected_properties,
            batch_size: raw.batch_size,
            num_train: raw.num_train,
            num_val: raw.num_val,
            num_workers: raw.num_workers,
            pin_memory: raw.pin_memory,
        };
        config.validate()?;
        Ok(config)
    }
}
