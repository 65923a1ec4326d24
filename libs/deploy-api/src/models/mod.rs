//! API models

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Path of the single trigger endpoint
pub const DEPLOY_PATH: &str = "/deploy";

/// Confirmation message sent with every successful deployment
pub const SUCCESS_MESSAGE: &str = "Deployment completed successfully";

/// Marker sent by the command line trigger
pub const MANUAL_TRIGGER: &str = "manual";

/// Body of a deploy request
///
/// The service accepts an empty body, so every field is optional. The
/// timestamp is informational and never used for ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TriggerRequest {
    /// Request stamped with the current time
    pub fn manual() -> Self {
        Self {
            trigger: Some(MANUAL_TRIGGER.to_string()),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }
}

/// Deployment outcome as returned by `POST /deploy`
///
/// Successful responses carry `message` and `output`, failed ones carry
/// `error` and `stderr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl DeployResponse {
    /// Successful deployment with the captured standard output
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(SUCCESS_MESSAGE.to_string()),
            output: Some(output.into()),
            error: None,
            stderr: None,
        }
    }

    /// Failed deployment with the error detail and captured standard error
    pub fn failed(error: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            output: None,
            error: Some(error.into()),
            stderr: Some(stderr.into()),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }

    pub fn error(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    pub fn stderr(&self) -> &str {
        self.stderr.as_deref().unwrap_or_default()
    }
}
