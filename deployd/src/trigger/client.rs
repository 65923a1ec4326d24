//! HTTP client for the deploy endpoint

use std::error::Error as StdError;
use std::time::Duration;

use deploy_api::{DeployResponse, TriggerRequest};
use http::StatusCode;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

/// Longest response body echoed back in a malformed-response error
const MAX_ECHOED_BODY: usize = 512;

/// Trigger client options
#[derive(Debug, Clone)]
pub struct Options {
    /// Full URL of the deploy endpoint
    pub url: String,

    /// Bound on the whole request, including the pipeline run on the server
    pub timeout: Duration,
}

/// The request never produced a usable deployment outcome
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("unexpected response from server ({status}): {body}")]
    Malformed { status: StatusCode, body: String },
}

/// What a single trigger attempt produced
#[derive(Debug)]
pub enum TriggerOutcome {
    /// The service ran the pipeline and it succeeded
    Deployed(DeployResponse),

    /// The service answered with `success: false`
    Rejected(DeployResponse),

    /// No well-formed answer was received
    RequestFailed(TriggerError),
}

impl TriggerOutcome {
    pub fn from_result(result: Result<DeployResponse, TriggerError>) -> Self {
        match result {
            Ok(response) if response.success => TriggerOutcome::Deployed(response),
            Ok(response) => TriggerOutcome::Rejected(response),
            Err(e) => TriggerOutcome::RequestFailed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TriggerOutcome::Deployed(_))
    }

    /// Process exit code: 0 deployed, 1 deployment failed, 2 request failed
    pub fn exit_code(&self) -> i32 {
        match self {
            TriggerOutcome::Deployed(_) => 0,
            TriggerOutcome::Rejected(_) => 1,
            TriggerOutcome::RequestFailed(_) => 2,
        }
    }
}

/// Fire-and-forget client: one request, no retries
pub struct TriggerClient {
    client: Client,
    url: String,
}

impl TriggerClient {
    pub fn new(options: &Options) -> Result<Self, TriggerError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| TriggerError::Client(error_chain(&e)))?;

        Ok(Self {
            client,
            url: options.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the trigger and decode the service's answer
    ///
    /// The body is decoded whatever the status, since the service answers
    /// failures with the same JSON shape.
    pub async fn send(&self) -> Result<DeployResponse, TriggerError> {
        debug!("POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&TriggerRequest::manual())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Undecodable deploy response ({}): {}", status, e);
            TriggerError::Malformed {
                status,
                body: truncate(&body, MAX_ECHOED_BODY),
            }
        })
    }

    /// Send once and classify the outcome
    pub async fn trigger(&self) -> TriggerOutcome {
        TriggerOutcome::from_result(self.send().await)
    }

    fn transport_error(&self, err: &reqwest::Error) -> TriggerError {
        error!("Deploy request to {} failed: {}", self.url, err);
        TriggerError::Transport {
            url: self.url.clone(),
            detail: error_chain(err),
        }
    }
}

/// Render an error with its sources, e.g. "error sending request: connection refused"
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
