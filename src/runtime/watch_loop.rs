//! # Watch Loop
//!
//! Controller watch loop that monitors Operation resources and feeds
//! reconcile requests to the TTL reconciler. Handles graceful shutdown and
//! automatic restart when the watch stream errors out or ends.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{self, ReconcileContext};
use crate::crd::Operation;
use crate::runtime::error_policy::{handle_reconcile_error, handle_watch_stream_error};
use crate::server::ServerState;
use futures::StreamExt;
use kube::api::Api;
use kube_runtime::{watcher, Controller};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller watch loop until shutdown is requested.
///
/// The kube runtime supplies the scheduling guarantees the reconciler relies
/// on: at most one in-flight reconcile per resource, redelivery after the
/// requested delay, and redelivery per the error policy on failure.
pub async fn run_watch_loop(
    operations: Api<Operation>,
    ctx: Arc<ReconcileContext>,
    server_state: Arc<ServerState>,
    config: &ControllerConfig,
) -> Result<(), anyhow::Error> {
    info!("Starting controller watch loop");

    let backoff_ms = Arc::new(AtomicU64::new(config.backoff_start_ms));

    // Mark the server not-ready on SIGINT/SIGTERM so the readiness probe
    // drains traffic while in-flight reconciles finish.
    let shutdown_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal, initiating graceful shutdown");
        shutdown_state.set_ready(false);
    });

    loop {
        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let backoff_start_ms = config.backoff_start_ms;
        let backoff_max_ms = config.backoff_max_ms;
        let watch_restart_delay_secs = config.watch_restart_delay_secs;
        let stream_backoff = Arc::clone(&backoff_ms);

        Controller::new(operations.clone(), watcher::Config::default().any_semantic())
            .shutdown_on_signal()
            .run(reconciler::reconcile, handle_reconcile_error, Arc::clone(&ctx))
            .filter_map(move |event| {
                let backoff = Arc::clone(&stream_backoff);
                async move {
                    match &event {
                        Ok(_) => {
                            backoff.store(backoff_start_ms, Ordering::Relaxed);
                            debug!("watch.event.success");
                            Some(event)
                        }
                        Err(err) => {
                            let error_string = format!("{err:?}");
                            handle_watch_stream_error(
                                &error_string,
                                &backoff,
                                backoff_max_ms,
                                watch_restart_delay_secs,
                            )
                            .await
                            .map(|()| event)
                        }
                    }
                }
            })
            .for_each(|_| futures::future::ready(()))
            .await;

        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        // Stream ended without a shutdown request; restart the watch.
        let delay_secs = config.watch_restart_delay_after_end_secs;
        warn!(
            "Controller watch stream ended, restarting in {} seconds",
            delay_secs
        );
        tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}
