//! Suite state predicates and status aggregation
//!
//! Status is never patched incrementally: each pass rebuilds the whole
//! status value from the recorded execution history plus the pods observed
//! right now, and the reconciler persists the result wholesale. Execution
//! phases only ever advance; an execution whose pod has disappeared keeps
//! its last known phase.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::warn;

use crate::controller::error::Result;
use crate::crd::{
    Execution, ExecutionPhase, SuitePhase, TestDefinition, TestResult, TestSuite, TestSuiteStatus,
};

/// Time source injected into the status logic so folds are reproducible in
/// tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// State predicates and status folds for TestSuite resources
pub struct StatusService {
    clock: Arc<dyn Clock>,
}

impl StatusService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// A suite is uninitialized until `initialize_tests` has produced a
    /// status for it. A persisted-but-empty result list still counts as
    /// initialized (zero definitions matched), which is why the start
    /// timestamp is consulted as well.
    pub fn is_uninitialized(&self, suite: &TestSuite) -> bool {
        match &suite.status {
            None => true,
            Some(status) => status.results.is_empty() && status.start_time.is_none(),
        }
    }

    /// A suite is finished when every test has used up its repeat count and
    /// its last execution is terminal. Zero results is vacuously finished.
    pub fn is_finished(&self, suite: &TestSuite) -> bool {
        suite
            .status
            .as_ref()
            .is_some_and(|status| results_finished(suite.spec.count, &status.results))
    }

    /// Build the initial status: one result per matched definition with no
    /// executions, preserving the order the definitions were returned in.
    /// An empty match is not an error; it yields an empty-but-initialized
    /// status that finishes the suite on the next pass.
    pub fn initialize_tests(
        &self,
        _suite: &TestSuite,
        definitions: &[TestDefinition],
    ) -> Result<TestSuiteStatus> {
        let results = definitions
            .iter()
            .map(|def| TestResult {
                name: def.name_any(),
                namespace: def.namespace().unwrap_or_default(),
                disable_concurrency: def.spec.disable_concurrency,
                executions: Vec::new(),
            })
            .collect();

        Ok(TestSuiteStatus {
            phase: SuitePhase::Pending,
            start_time: Some(self.clock.now().to_rfc3339()),
            completion_time: None,
            results,
        })
    }

    /// Fold the observed pods into the recorded status.
    ///
    /// Each execution is correlated to its pod by deterministic name within
    /// the test's namespace. Observed pod phases map `Pending → Scheduled`,
    /// `Running → Running`, `Succeeded → Succeeded`, `Failed → Failed`; an
    /// unmatched execution or an unknown pod phase leaves the recorded
    /// phase in place. Never creates or schedules anything.
    pub fn ensure_status_up_to_date(
        &self,
        suite: &TestSuite,
        pods: &[Pod],
    ) -> Result<TestSuiteStatus> {
        let count = suite.spec.count;
        let mut status = suite.status.clone().unwrap_or_default();

        for result in &mut status.results {
            if (result.executions.len() as i64) > count {
                // Malformed status; keep the history rather than block the suite
                warn!(
                    test = %result.name,
                    executions = result.executions.len(),
                    count,
                    "recorded executions exceed the repeat count"
                );
            }
            for execution in &mut result.executions {
                let Some(pod) = find_pod(pods, &result.namespace, &execution.id) else {
                    continue;
                };
                let Some(observed) = pod_phase(pod) else {
                    continue;
                };
                self.apply_observation(execution, observed);
            }
        }

        status.phase = derive_phase(count, &status.results);
        if status.phase.is_terminal() && status.completion_time.is_none() {
            status.completion_time = Some(self.clock.now().to_rfc3339());
        }

        Ok(status)
    }

    /// Advance-only phase update; terminal phases are sticky
    fn apply_observation(&self, execution: &mut Execution, observed: ExecutionPhase) {
        if execution.phase.is_terminal() || observed.rank() <= execution.phase.rank() {
            return;
        }
        if execution.start_time.is_none() {
            execution.start_time = Some(self.clock.now().to_rfc3339());
        }
        if observed.is_terminal() {
            execution.completion_time = Some(self.clock.now().to_rfc3339());
        }
        execution.phase = observed;
    }
}

/// Terminal invariant over a result list
pub(crate) fn results_finished(count: i64, results: &[TestResult]) -> bool {
    results.iter().all(|result| {
        !result.has_pending_executions(count)
            && result
                .executions
                .last()
                .map_or(true, |e| e.phase.is_terminal())
    })
}

/// Derive the overall suite phase from its results
pub fn derive_phase(count: i64, results: &[TestResult]) -> SuitePhase {
    if results_finished(count, results) {
        let all_succeeded = results
            .iter()
            .flat_map(|r| &r.executions)
            .all(|e| e.phase == ExecutionPhase::Succeeded);
        if all_succeeded {
            SuitePhase::Succeeded
        } else {
            SuitePhase::Failed
        }
    } else if results.iter().any(|r| !r.executions.is_empty()) {
        SuitePhase::Running
    } else {
        SuitePhase::Pending
    }
}

fn find_pod<'a>(pods: &'a [Pod], namespace: &str, name: &str) -> Option<&'a Pod> {
    pods.iter().find(|pod| {
        pod.metadata.name.as_deref() == Some(name)
            && pod.metadata.namespace.as_deref() == Some(namespace)
    })
}

/// Map an observed pod phase onto an execution phase
fn pod_phase(pod: &Pod) -> Option<ExecutionPhase> {
    match pod.status.as_ref()?.phase.as_deref()? {
        "Pending" => Some(ExecutionPhase::Scheduled),
        "Running" => Some(ExecutionPhase::Running),
        "Succeeded" => Some(ExecutionPhase::Succeeded),
        "Failed" => Some(ExecutionPhase::Failed),
        _ => None,
    }
}
