//! HTTP server setup

use std::future::Future;
use std::net::SocketAddr;

use axum::{routing::post, Router};
use deploy_api::DEPLOY_PATH;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::DeployError;
use crate::server::handlers::{deploy_handler, not_found_handler, preflight_handler};
use crate::server::state::ServerState;

/// Build the router
///
/// Only `POST /deploy` reaches the pipeline. Preflights are answered for
/// `/deploy` alone; every other path or method is a plain 404.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            DEPLOY_PATH,
            post(deploy_handler)
                .options(preflight_handler)
                .fallback(not_found_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
///
/// Returns the bound address and the task driving the server.
pub async fn serve(
    options: &ServerOptions,
    state: ServerState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, JoinHandle<Result<(), DeployError>>), DeployError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting deploy server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DeployError::ServerError(format!("failed to bind {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| DeployError::ServerError(e.to_string()))?;

    info!("Listening on {}", local_addr);

    let handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| DeployError::ServerError(e.to_string()))
    });

    Ok((local_addr, handle))
}
