//! Test selection strategy
//!
//! Selection is deliberately boring: the first eligible entry in stored
//! list order wins. No weighting, no randomness, no round-robin; repeated
//! passes over the same status must pick the same test.

use crate::crd::{TestResult, TestSuite};

/// Picks the next test owed an execution under the suite's repeat count
pub trait RepeatStrategy: Send + Sync {
    /// First test in stored order that may run alongside others and still
    /// has executions to spare
    fn test_to_run_concurrently<'a>(&self, suite: &'a TestSuite) -> Option<&'a TestResult>;

    /// Same scan over the concurrency-disabled tests
    fn test_to_run_sequentially<'a>(&self, suite: &'a TestSuite) -> Option<&'a TestResult>;
}

/// Runs every test until it has `spec.count` executions, scanning results
/// in stored order
#[derive(Clone, Copy, Debug, Default)]
pub struct RepeatUntilCount;

impl RepeatUntilCount {
    fn next_pending<'a>(
        &self,
        suite: &'a TestSuite,
        matches: impl Fn(&TestResult) -> bool,
    ) -> Option<&'a TestResult> {
        let count = suite.spec.count;
        suite
            .status
            .as_ref()?
            .results
            .iter()
            .find(|result| matches(result) && result.has_pending_executions(count))
    }
}

impl RepeatStrategy for RepeatUntilCount {
    fn test_to_run_concurrently<'a>(&self, suite: &'a TestSuite) -> Option<&'a TestResult> {
        self.next_pending(suite, |result| !result.disable_concurrency)
    }

    fn test_to_run_sequentially<'a>(&self, suite: &'a TestSuite) -> Option<&'a TestResult> {
        self.next_pending(suite, |result| result.disable_concurrency)
    }
}
