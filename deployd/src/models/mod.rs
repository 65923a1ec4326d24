//! Service-side models

pub mod deployment;

pub use deployment::DeployRequest;
