//! Pipeline outcome types

use std::fmt;
use std::time::Duration;

/// Standard output and error of every step that ran, in step order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub stdout: String,
    pub stderr: String,
}

impl PipelineOutput {
    pub fn push(&mut self, stdout: &str, stderr: &str) {
        self.stdout.push_str(stdout);
        self.stderr.push_str(stderr);
    }
}

/// Why a pipeline stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The step exited non-zero, or was killed by a signal when `code` is `None`
    ExitStatus { code: Option<i32> },

    /// The whole run exceeded its time bound and the step was killed
    TimedOut { after: Duration },

    /// The shell could not be started for the step
    Spawn { message: String },

    /// No steps are configured
    EmptyPipeline,
}

/// Failure detail: which step, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    /// Zero-based position of the failing step
    pub step_index: Option<usize>,
    pub command: Option<String>,
    pub reason: FailureReason,
}

impl PipelineFailure {
    pub fn at_step(step_index: usize, command: &str, reason: FailureReason) -> Self {
        Self {
            step_index: Some(step_index),
            command: Some(command.to_string()),
            reason,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.reason, FailureReason::TimedOut { .. })
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Steps are numbered from 1 in messages meant for operators.
        let step = match (self.step_index, self.command.as_deref()) {
            (Some(index), Some(command)) => format!("step {} (`{}`)", index + 1, command),
            (Some(index), None) => format!("step {}", index + 1),
            _ => "pipeline".to_string(),
        };

        match &self.reason {
            FailureReason::ExitStatus { code: Some(code) } => {
                write!(f, "{} exited with status {}", step, code)
            }
            FailureReason::ExitStatus { code: None } => {
                write!(f, "{} was terminated by a signal", step)
            }
            FailureReason::TimedOut { after } => {
                write!(f, "timed out after {}s during {}", after.as_secs(), step)
            }
            FailureReason::Spawn { message } => {
                write!(f, "{} could not be started: {}", step, message)
            }
            FailureReason::EmptyPipeline => write!(f, "pipeline has no steps configured"),
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Success(PipelineOutput),
    Failure {
        output: PipelineOutput,
        failure: PipelineFailure,
    },
}

impl PipelineResult {
    pub fn success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }

    pub fn output(&self) -> &PipelineOutput {
        match self {
            PipelineResult::Success(output) => output,
            PipelineResult::Failure { output, .. } => output,
        }
    }

    pub fn stdout(&self) -> &str {
        &self.output().stdout
    }

    pub fn stderr(&self) -> &str {
        &self.output().stderr
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        match self {
            PipelineResult::Success(_) => None,
            PipelineResult::Failure { failure, .. } => Some(failure),
        }
    }

    pub fn failing_step_index(&self) -> Option<usize> {
        self.failure().and_then(|failure| failure.step_index)
    }

    pub fn error_message(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }
}
