//! Wire models for the deploy service
//!
//! Shared between the `deployd` service, which encodes them, and the
//! `deploy-trigger` client, which decodes them.

pub mod models;

pub use models::{DeployResponse, TriggerRequest, DEPLOY_PATH, MANUAL_TRIGGER, SUCCESS_MESSAGE};
