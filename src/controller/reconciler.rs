//! Reconciliation logic for TestSuite resources
//!
//! A level-triggered control loop: each pass re-derives the suite's status
//! from live pod observations plus the recorded execution history,
//! schedules at most one new execution, persists, and requeues on a fixed
//! interval. The periodic self-wakeup compensates for missed pod events;
//! the loop never assumes every relevant notification reaches it.

use std::sync::Arc;
use std::time::Duration;

use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use tracing::{debug, error, info, instrument, warn};

use crate::controller::context::Context;
use crate::controller::error::{BackoffConfig, Error, Result};
use crate::crd::{TestSuite, TestSuiteStatus};
use crate::resources::FIELD_MANAGER;

/// Fixed self-wakeup interval while a suite is in progress
pub const REQUEUE_INTERVAL: Duration = Duration::from_secs(60);

/// Main reconciliation function
#[instrument(skip(suite, ctx), fields(suite = %suite.name_any()))]
pub async fn reconcile(suite: Arc<TestSuite>, ctx: Arc<Context>) -> Result<Action> {
    if ctx.status.is_uninitialized(&suite) {
        info!("Initializing suite");
        let definitions = ctx.definitions.find_matching(&suite).await?;
        let status = ctx.status.initialize_tests(&suite, &definitions)?;
        info!(tests = status.results.len(), "Suite initialized");
        update_status(&ctx, &suite, status).await?;
        // Re-enter right away to start scheduling against the fresh status
        return Ok(Action::requeue(Duration::ZERO));
    }

    if ctx.status.is_finished(&suite) {
        debug!("Suite is finished, nothing to do");
        return Ok(Action::await_change());
    }

    // Suite is in progress: fold observed pod state into the status, then
    // try to launch the next execution
    let pods = ctx.pods.pods_for_suite(&suite).await?;
    let status = ctx.status.ensure_status_up_to_date(&suite, &pods)?;

    let mut refreshed = (*suite).clone();
    refreshed.status = Some(status);

    let (pod, status) = ctx.scheduler.try_schedule_test(&refreshed).await?;
    if let Some(pod) = pod {
        info!(pod = %pod.name_any(), "Launching execution pod");
        ctx.pod_creator.create(&pod).await?;
    }

    update_status(&ctx, &suite, status).await?;

    Ok(Action::requeue(REQUEUE_INTERVAL))
}

/// Error policy for the controller with exponential backoff
pub fn error_policy(suite: Arc<TestSuite>, error: &Error, _ctx: Arc<Context>) -> Action {
    let name = suite.name_any();
    let backoff = BackoffConfig::default();
    let delay = backoff.delay_for_error(error, 0);

    if error.is_retryable() {
        warn!(
            "Retryable error for {}: {:?}, requeuing in {:?}",
            name, error, delay
        );
    } else {
        error!(
            "Non-retryable error for {}: {:?}, requeuing in {:?}",
            name, error, delay
        );
    }

    Action::requeue(delay)
}

/// Persist the suite status wholesale; last write wins
async fn update_status(ctx: &Context, suite: &TestSuite, status: TestSuiteStatus) -> Result<()> {
    let api: Api<TestSuite> = Api::all(ctx.client.clone());
    let name = suite.name_any();

    let patch = serde_json::json!({
        "status": status
    });

    api.patch_status(
        &name,
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(&patch),
    )
    .await?;

    Ok(())
}
