//! Deployment pipeline
//!
//! A pipeline is a fixed, ordered list of shell steps run as one unit.
//! Execution is fail-fast: the first step exiting non-zero ends the run.

pub mod executor;
pub mod pipeline;
pub mod result;
pub mod shell;

pub use executor::PipelineExecutor;
pub use pipeline::{Pipeline, PipelineStep};
pub use result::{FailureReason, PipelineFailure, PipelineOutput, PipelineResult};
pub use shell::ShellExecutor;
