//! Pipeline executor seam

use async_trait::async_trait;

use crate::deploy::result::PipelineResult;

/// Runs the configured pipeline once
///
/// Implementations never fail out of band: every outcome, including a
/// timeout or a step that cannot be spawned, is reported as a
/// [`PipelineResult`]. Callers are responsible for not invoking `execute`
/// concurrently with itself.
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    async fn execute(&self) -> PipelineResult;
}
