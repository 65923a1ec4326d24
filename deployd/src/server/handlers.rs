//! HTTP request handlers

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use deploy_api::{DeployResponse, TriggerRequest};
use tracing::{error, info, warn};

use crate::deploy::PipelineResult;
use crate::models::DeployRequest;
use crate::server::guard::ConcurrencyPolicy;
use crate::server::state::ServerState;

/// Largest request body accepted on `/deploy`
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Error sent back when a deployment is already running
pub const BUSY_MESSAGE: &str = "a deployment is already in progress";

/// Run the pipeline once and report its outcome
pub async fn deploy_handler(State(state): State<ServerState>, request: Request) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let mut deploy_request = DeployRequest::new(remote_addr);

    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!(origin = %deploy_request.origin(), "Unreadable deploy request body: {}", e);
            return failure(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e));
        }
    };

    match parse_trigger(&body) {
        Ok(trigger) => deploy_request.trigger = trigger.trigger,
        Err(e) => {
            warn!(origin = %deploy_request.origin(), "Malformed deploy request body: {}", e);
            return failure(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e));
        }
    }

    info!(
        origin = %deploy_request.origin(),
        trigger = deploy_request.trigger.as_deref().unwrap_or("none"),
        received_at = %deploy_request.received_at.to_rfc3339(),
        "Deploy request received"
    );

    if state.guard.policy() == ConcurrencyPolicy::Queue && state.guard.is_busy() {
        info!(origin = %deploy_request.origin(), "Deployment in progress, request queued");
    }

    let Some(permit) = state.guard.acquire().await else {
        warn!(origin = %deploy_request.origin(), "Deployment already in progress, rejecting");
        return failure(StatusCode::CONFLICT, BUSY_MESSAGE);
    };

    // The pipeline owns the permit and keeps running even if the caller hangs up.
    let executor = state.executor.clone();
    let run = tokio::spawn(async move {
        let _permit = permit;
        executor.execute().await
    });

    match run.await {
        Ok(result) => pipeline_response(result),
        Err(e) => {
            error!("Deployment task aborted: {}", e);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("deployment task aborted: {}", e),
            )
        }
    }
}

/// Answer a capability check on `/deploy` without side effects
pub async fn preflight_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::CONTENT_TYPE, "application/json"),
        ],
    )
}

/// Any other path or method
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Map a pipeline outcome onto the wire response
pub fn pipeline_response(result: PipelineResult) -> Response {
    match result {
        PipelineResult::Success(output) => {
            info!("Deployment successful");
            json_response(StatusCode::OK, DeployResponse::succeeded(output.stdout))
        }
        PipelineResult::Failure { output, failure } => {
            error!("Deployment failed: {}", failure);
            if !output.stderr.is_empty() {
                error!("Deployment stderr:\n{}", output.stderr);
            }
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                DeployResponse::failed(failure.to_string(), output.stderr),
            )
        }
    }
}

fn parse_trigger(body: &[u8]) -> Result<TriggerRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TriggerRequest::default());
    }
    serde_json::from_slice(body)
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    json_response(status, DeployResponse::failed(error, ""))
}

fn json_response(status: StatusCode, body: DeployResponse) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}
