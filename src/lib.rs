pub mod controller;
pub mod crd;
pub mod resources;

pub use controller::{
    Context, Error, REQUEUE_INTERVAL, RepeatStrategy, RepeatUntilCount, Result, Scheduler,
    StatusService, error_policy, reconcile,
};
pub use crd::{TestDefinition, TestSuite};

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::Controller;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::{Api, Client};

/// Run the operator controller (cluster-wide).
///
/// This is the main controller loop that watches TestSuite resources and
/// reconciles them. It can be called from main.rs or spawned as a
/// background task.
pub async fn run_controller(client: Client) {
    tracing::info!("Starting controller for TestSuite resources");

    let ctx = Arc::new(Context::new(client.clone()));

    let suites: Api<TestSuite> = Api::all(client.clone());
    let pods: Api<Pod> = Api::all(client);

    let watcher_config = WatcherConfig::default().any_semantic();

    // Watch TestSuite plus the pods it owns, so pod phase changes trigger a
    // reconciliation pass without waiting for the periodic requeue
    Controller::new(suites, watcher_config.clone())
        .owns(pods, watcher_config)
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    tracing::debug!("Reconciled: {}", obj.name);
                }
                Err(e) => {
                    // NotFound errors are expected after deletion when
                    // related watch events trigger reconciliation for a
                    // deleted suite. Log these at debug level instead of error.
                    let is_not_found = matches!(
                        &e,
                        kube::runtime::controller::Error::ReconcilerFailed(err, _) if err.is_not_found()
                    );
                    if is_not_found {
                        tracing::debug!("Suite no longer exists (likely deleted): {:?}", e);
                    } else {
                        tracing::error!("Reconciliation error: {:?}", e);
                    }
                }
            }
        })
        .await;

    // This should never complete in normal operation
    tracing::error!("Controller stream ended unexpectedly");
}
