//! Server state

use std::sync::Arc;

use crate::deploy::PipelineExecutor;
use crate::server::guard::DeployGuard;

/// Server state shared across handlers
#[derive(Clone)]
pub struct ServerState {
    pub executor: Arc<dyn PipelineExecutor>,
    pub guard: DeployGuard,
}

impl ServerState {
    pub fn new(executor: Arc<dyn PipelineExecutor>, guard: DeployGuard) -> Self {
        Self { executor, guard }
    }
}
