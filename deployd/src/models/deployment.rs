//! Deployment models

use std::net::SocketAddr;

use chrono::{DateTime, Utc};

/// One inbound trigger, kept only for the lifetime of the HTTP call
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// When the service accepted the request
    pub received_at: DateTime<Utc>,

    /// Peer address, for logging only
    pub remote_addr: Option<SocketAddr>,

    /// Trigger marker sent by the client, if any
    pub trigger: Option<String>,
}

impl DeployRequest {
    pub fn new(remote_addr: Option<SocketAddr>) -> Self {
        Self {
            received_at: Utc::now(),
            remote_addr,
            trigger: None,
        }
    }

    /// Peer address for log lines
    pub fn origin(&self) -> String {
        self.remote_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
