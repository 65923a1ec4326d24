//! Deployment HTTP service

pub mod guard;
pub mod handlers;
pub mod serve;
pub mod state;

pub use guard::{ConcurrencyPolicy, DeployGuard};
pub use serve::{router, serve};
pub use state::ServerState;
