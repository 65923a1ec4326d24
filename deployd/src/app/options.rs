//! Application configuration options

use crate::deploy::Pipeline;
use crate::server::ConcurrencyPolicy;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Pipeline every deployment runs
    pub pipeline: Pipeline,

    /// Handling of overlapping deploy requests
    pub concurrency: ConcurrencyPolicy,
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}
