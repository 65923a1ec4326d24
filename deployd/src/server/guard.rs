//! Single-flight guard around pipeline execution

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// What to do with a deploy request that arrives while another is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyPolicy {
    /// Answer immediately with a busy response
    #[default]
    Reject,

    /// Wait for the running deployment, then run
    Queue,
}

/// Exclusive access to the project checkout
///
/// The permit is an owned guard so it can move into the task running the
/// pipeline and is released however that task ends.
#[derive(Debug, Clone)]
pub struct DeployGuard {
    lock: Arc<Mutex<()>>,
    policy: ConcurrencyPolicy,
}

pub type DeployPermit = OwnedMutexGuard<()>;

impl DeployGuard {
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            policy,
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Acquire the permit according to the policy
    ///
    /// Returns `None` only under [`ConcurrencyPolicy::Reject`] when a
    /// deployment is already running.
    pub async fn acquire(&self) -> Option<DeployPermit> {
        match self.policy {
            ConcurrencyPolicy::Reject => self.lock.clone().try_lock_owned().ok(),
            ConcurrencyPolicy::Queue => Some(self.lock.clone().lock_owned().await),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
