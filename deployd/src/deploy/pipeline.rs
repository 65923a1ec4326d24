//! Pipeline definition

use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single shell step and the directory it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub command: String,
    pub working_dir: PathBuf,
}

impl PipelineStep {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }
}

/// The ordered step list every deployment executes
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,

    /// Wall-clock bound for the whole run, not per step
    timeout: Duration,
}

impl Pipeline {
    pub fn new(steps: Vec<PipelineStep>, timeout: Duration) -> Self {
        Self { steps, timeout }
    }

    /// Build a pipeline whose steps all run in `dir`
    pub fn in_dir<I, S>(dir: &Path, commands: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = commands
            .into_iter()
            .map(|command| PipelineStep::new(command, dir))
            .collect();
        Self::new(steps, timeout)
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
