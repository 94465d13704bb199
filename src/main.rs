//! # Operation TTL Controller
//!
//! A Kubernetes controller that garbage-collects finished `Operation`
//! custom resources.
//!
//! ## Overview
//!
//! Operation resources represent long-running asynchronous tasks executed
//! by an external runner. Once a task reaches a terminal state and the
//! resource carries a `ttlSecondsAfterFinished` policy, this controller:
//!
//! 1. **Watches Operations** across all namespaces
//! 2. **Filters** out resources that can never expire (no TTL, still
//!    running, already being deleted)
//! 3. **Deletes** resources whose TTL has elapsed since completion
//! 4. **Requeues** not-yet-expired resources for exactly the remaining TTL
//!
//! Deletion is idempotent: a resource removed by a concurrent reconcile or
//! by hand counts as successfully cleaned up.
//!
//! ## Usage
//!
//! See the [README.md](../README.md) for deployment instructions.

use anyhow::Result;
use kube::{api::Api, Client};
use operation_ttl_controller::config::ControllerConfig;
use operation_ttl_controller::controller::reconciler::ReconcileContext;
use operation_ttl_controller::crd::Operation;
use operation_ttl_controller::observability::metrics;
use operation_ttl_controller::runtime::watch_loop::run_watch_loop;
use operation_ttl_controller::server::{start_server, ServerState};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "operation_ttl_controller=info".into()),
        )
        .init();

    info!("Starting Operation TTL Controller");

    let config = ControllerConfig::from_env();

    metrics::register_metrics()?;

    // Start the HTTP server for metrics and probes.
    let server_state = Arc::new(ServerState::new());
    let probe_state = Arc::clone(&server_state);
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(err) = start_server(metrics_port, probe_state).await {
            error!("HTTP server error: {}", err);
        }
    });

    let client = Client::try_default().await?;

    // Watch Operations across all namespaces.
    let operations: Api<Operation> = Api::all(client.clone());

    let ctx = Arc::new(ReconcileContext::new(client));

    server_state.set_ready(true);

    run_watch_loop(operations, ctx, server_state, &config).await?;

    info!("Controller stopped");

    Ok(())
}
