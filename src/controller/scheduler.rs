//! Scheduling of test executions
//!
//! At most one pod is launched per reconciliation pass. The decision is a
//! pure function of the suite value passed in: the same suite and status
//! always yield the same candidate and the same pod identity, so a retried
//! pass after a crash or a missed event can never double-fill an execution
//! slot.

use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::debug;

use crate::controller::definitions::DefinitionsService;
use crate::controller::error::{Error, Result};
use crate::controller::strategy::RepeatStrategy;
use crate::crd::{Execution, ExecutionPhase, SuitePhase, TestResult, TestSuite, TestSuiteStatus};
use crate::resources::pod::execution_pod;

/// Picks the next test and emits the launch decision
pub struct Scheduler {
    strategy: Arc<dyn RepeatStrategy>,
    definitions: Arc<dyn DefinitionsService>,
}

impl Scheduler {
    pub fn new(strategy: Arc<dyn RepeatStrategy>, definitions: Arc<dyn DefinitionsService>) -> Self {
        Self {
            strategy,
            definitions,
        }
    }

    /// Try to schedule one execution for the suite.
    ///
    /// Sequential tests are considered first and serialize with each other:
    /// a sequential candidate is skipped while any sequential test has a
    /// scheduled-or-running execution. The gate includes `Scheduled`
    /// because two sequential pods could otherwise be launched between
    /// observation passes. Concurrent tests are eligible regardless of
    /// in-flight sequential executions.
    ///
    /// Returns `(None, status unchanged)` when nothing is eligible. That
    /// is backpressure, not failure; the caller requeues and re-checks.
    pub async fn try_schedule_test(
        &self,
        suite: &TestSuite,
    ) -> Result<(Option<Pod>, TestSuiteStatus)> {
        let Some(candidate) = self.select_candidate(suite) else {
            return Ok((None, suite.status.clone().unwrap_or_default()));
        };
        let (name, namespace) = (candidate.name.clone(), candidate.namespace.clone());

        let definition = self.definitions.get(&name, &namespace).await?;

        let mut status = suite.status.clone().unwrap_or_default();
        let result = status
            .results
            .iter_mut()
            .find(|r| r.name == name && r.namespace == namespace)
            .ok_or(Error::MissingObjectKey("status.results"))?;

        let index = result.executions.len();
        let pod = execution_pod(suite, &definition, index);
        result.executions.push(Execution {
            id: pod.name_any(),
            phase: ExecutionPhase::Scheduled,
            start_time: None,
            completion_time: None,
        });
        status.phase = SuitePhase::Running;

        debug!(test = %name, execution = index, "selected test for execution");
        Ok((Some(pod), status))
    }

    fn select_candidate<'a>(&self, suite: &'a TestSuite) -> Option<&'a TestResult> {
        if let Some(sequential) = self.strategy.test_to_run_sequentially(suite) {
            if !sequential_inflight(suite) {
                return Some(sequential);
            }
            debug!(
                test = %sequential.name,
                "sequential execution in flight, candidate deferred"
            );
        }
        self.strategy.test_to_run_concurrently(suite)
    }
}

/// Whether any sequential test currently has a non-terminal execution
fn sequential_inflight(suite: &TestSuite) -> bool {
    suite.status.as_ref().is_some_and(|status| {
        status
            .results
            .iter()
            .any(|r| r.disable_concurrency && r.has_inflight_execution())
    })
}
