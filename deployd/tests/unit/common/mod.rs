//! Shared test helpers

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deployd::deploy::{
    FailureReason, PipelineExecutor, PipelineFailure, PipelineOutput, PipelineResult,
};
use deployd::server::{ConcurrencyPolicy, DeployGuard, ServerState};

/// Counters shared between a [`MockExecutor`] and the test
#[derive(Debug, Default)]
pub struct Counters {
    pub running: AtomicUsize,
    pub max_running: AtomicUsize,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
}

impl Counters {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

/// Executor standing in for the real checkout and process supervisor
pub struct MockExecutor {
    pub counters: Arc<Counters>,
    pub delay: Duration,
    pub result: PipelineResult,
    pub panic: bool,
}

impl MockExecutor {
    pub fn succeeding(stdout: &str) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            delay: Duration::ZERO,
            result: PipelineResult::Success(PipelineOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
            panic: false,
        }
    }

    pub fn failing(step_index: usize, command: &str, stderr: &str) -> Self {
        Self {
            result: PipelineResult::Failure {
                output: PipelineOutput {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
                failure: PipelineFailure::at_step(
                    step_index,
                    command,
                    FailureReason::ExitStatus { code: Some(1) },
                ),
            },
            ..Self::succeeding("")
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::succeeding("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PipelineExecutor for MockExecutor {
    async fn execute(&self) -> PipelineResult {
        let counters = &self.counters;
        counters.started.fetch_add(1, Ordering::SeqCst);
        let running = counters.running.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_running.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        counters.running.fetch_sub(1, Ordering::SeqCst);
        if self.panic {
            panic!("executor blew up");
        }
        counters.completed.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Server state around a mock, plus the mock's counters
pub fn mock_state(executor: MockExecutor, policy: ConcurrencyPolicy) -> (ServerState, Arc<Counters>) {
    let counters = executor.counters.clone();
    let state = ServerState::new(Arc::new(executor), DeployGuard::new(policy));
    (state, counters)
}
