//! Run Record - lifecycle of one pipeline run

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::ProcessType;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Run is moving through the stations.
    Running,
    /// Run reached the finisher and was persisted.
    Success,
}

/// Run Record describes a single execution of a model/module/trainer triad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    model: String,
    module: String,
    trainer: String,
    process_type: Option<ProcessType>,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    location: Option<PathBuf>,
}

impl RunRecord {
    /// Create a builder for constructing a run record.
    #[must_use]
    pub fn builder(run_id: impl Into<String>) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the model adapter name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the module adapter name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Get the trainer adapter name.
    #[must_use]
    pub fn trainer(&self) -> &str {
        &self.trainer
    }

    /// Get the executed process type, once the process station has run.
    #[must_use]
    pub const fn process_type(&self) -> Option<ProcessType> {
        self.process_type
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the start timestamp, if the run has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the directory the run was persisted to, if any.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Start the run, transitioning from Pending to Running.
    ///
    /// Sets the `started_at` timestamp to now.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Record which process the run executed.
    pub fn set_process_type(&mut self, process_type: ProcessType) {
        self.process_type = Some(process_type);
    }

    /// Record where the run was persisted.
    pub fn set_location(&mut self, location: impl Into<PathBuf>) {
        self.location = Some(location.into());
    }

    /// Complete the run with the given final status.
    ///
    /// Sets the `ended_at` timestamp to now.
    pub fn complete(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    run_id: String,
    model: String,
    module: String,
    trainer: String,
    process_type: Option<ProcessType>,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            model: String::new(),
            module: String::new(),
            trainer: String::new(),
            process_type: None,
        }
    }

    /// Set the model adapter name.
    #[must_use]
    pub fn model(mut self, name: impl Into<String>) -> Self {
        self.model = name.into();
        self
    }

    /// Set the module adapter name.
    #[must_use]
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.module = name.into();
        self
    }

    /// Set the trainer adapter name.
    #[must_use]
    pub fn trainer(mut self, name: impl Into<String>) -> Self {
        self.trainer = name.into();
        self
    }

    /// Set the process type up front.
    #[must_use]
    pub const fn process_type(mut self, process_type: ProcessType) -> Self {
        self.process_type = Some(process_type);
        self
    }

    /// Build the `RunRecord` in Pending status.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            run_id: self.run_id,
            model: self.model,
            module: self.module,
            trainer: self.trainer,
            process_type: self.process_type,
            status: RunStatus::Pending,
            started_at: None,
            ended_at: None,
            location: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_default() {
        let run = RunRecord::builder("run-1").build();
        assert_eq!(run.status(), RunStatus::Pending);
        assert!(run.started_at().is_none());
        assert!(run.process_type().is_none());
    }

    #[test]
    fn test_run_lifecycle() {
        let mut run = RunRecord::builder("m1_train_0")
            .model("m1")
            .module("d1")
            .trainer("t1")
            .build();
        run.start();
        assert_eq!(run.status(), RunStatus::Running);

        run.set_process_type(ProcessType::Train);
        run.set_location("/tmp/runs/m1/m1_train_0");
        run.complete(RunStatus::Success);

        assert_eq!(run.status(), RunStatus::Success);
        assert_eq!(run.process_type(), Some(ProcessType::Train));
        assert_eq!(run.location(), Some(Path::new("/tmp/runs/m1/m1_train_0")));
        assert!(run.ended_at() >= run.started_at());
    }

    #[test]
    fn test_run_record_serializes() {
        let run = RunRecord::builder("r").model("m1").build();
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"status\":\"Pending\""));

        let back: RunRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }
}
