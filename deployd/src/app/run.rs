//! Main service run loop

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::deploy::{PipelineExecutor, ShellExecutor};
use crate::errors::DeployError;
use crate::server::{serve, DeployGuard, ServerState};

/// Run the deploy service until the shutdown signal resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeployError> {
    let executor = Arc::new(ShellExecutor::new(options.pipeline.clone()));
    run_with_executor(options, executor, shutdown_signal).await
}

/// Run the deploy service with a caller-supplied executor
pub async fn run_with_executor(
    options: AppOptions,
    executor: Arc<dyn PipelineExecutor>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeployError> {
    info!(
        steps = options.pipeline.steps().len(),
        timeout_secs = options.pipeline.timeout().as_secs(),
        concurrency = ?options.concurrency,
        "Initializing deploy service..."
    );

    let state = ServerState::new(executor, DeployGuard::new(options.concurrency));
    let (_, handle) = serve(&options.server, state, shutdown_signal).await?;

    // Graceful shutdown lets an in-flight deployment finish before returning.
    match handle.await {
        Ok(result) => result?,
        Err(e) => {
            error!("Server task failed: {}", e);
            return Err(DeployError::Internal(e.to_string()));
        }
    }

    info!("Deploy service stopped");
    Ok(())
}
