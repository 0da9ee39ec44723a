//! Test fixtures and builders for TestSuite and TestDefinition resources
//!
//! # Quick Start
//!
//! For simple cases, use the convenience functions:
//! ```rust,ignore
//! let suite = create_test_suite("all", 1);
//! let def = create_test_definition("smoke", "qa", false);
//! ```
//!
//! For suites with recorded history, use the builder:
//! ```rust,ignore
//! let suite = TestSuiteBuilder::new("all")
//!     .with_count(2)
//!     .with_results(vec![test_result("smoke", "qa", false, vec![])])
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodStatus, PodTemplateSpec};
use kube::ResourceExt;
use kube::core::ObjectMeta;

use testsuite_operator::controller::{Clock, DefinitionsService, Error, Result, definition_matches};
use testsuite_operator::crd::{
    Execution, ExecutionPhase, SuitePhase, TestDefinition, TestDefinitionSpec, TestSuite,
    TestSuiteSpec, TestSuiteStatus, TestResult, TestsSelector,
};
use testsuite_operator::resources::execution_labels;

// =============================================================================
// Clock
// =============================================================================

/// Clock pinned to a fixed instant so status folds are reproducible
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

// =============================================================================
// Convenience Functions for Simple Test Cases
// =============================================================================

/// Create a suite with no status (uninitialized)
pub fn create_test_suite(name: &str, count: i64) -> TestSuite {
    TestSuiteBuilder::new(name).with_count(count).build()
}

/// Create a definition with a minimal single-container template
pub fn create_test_definition(name: &str, namespace: &str, disable_concurrency: bool) -> TestDefinition {
    TestDefinition {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: TestDefinitionSpec {
            template: Some(PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "test".to_string(),
                        image: Some("alpine:latest".to_string()),
                        command: Some(vec!["pwd".to_string()]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
            disable_concurrency,
        },
    }
}

/// Create a definition carrying the given labels
pub fn create_labeled_definition(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
) -> TestDefinition {
    let mut def = create_test_definition(name, namespace, false);
    def.metadata.labels = Some(
        labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    def
}

/// One result record with the given execution history
pub fn test_result(
    name: &str,
    namespace: &str,
    disable_concurrency: bool,
    executions: Vec<Execution>,
) -> TestResult {
    TestResult {
        name: name.to_string(),
        namespace: namespace.to_string(),
        disable_concurrency,
        executions,
    }
}

/// One execution record in the given phase
pub fn execution(id: &str, phase: ExecutionPhase) -> Execution {
    Execution {
        id: id.to_string(),
        phase,
        start_time: None,
        completion_time: None,
    }
}

/// Build the pod that backs one execution slot, observed in `pod_phase`
/// ("Pending", "Running", "Succeeded", "Failed")
pub fn observed_pod(
    suite_name: &str,
    test_name: &str,
    namespace: &str,
    index: usize,
    pod_phase: &str,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(format!("{}-{}-{}", suite_name, test_name, index)),
            namespace: Some(namespace.to_string()),
            labels: Some(execution_labels(suite_name, test_name)),
            ..Default::default()
        },
        spec: None,
        status: Some(PodStatus {
            phase: Some(pod_phase.to_string()),
            ..Default::default()
        }),
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for TestSuite resources
pub struct TestSuiteBuilder {
    name: String,
    count: i64,
    selectors: Option<TestsSelector>,
    status: Option<TestSuiteStatus>,
}

impl TestSuiteBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 1,
            selectors: None,
            status: None,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_selectors(mut self, selectors: TestsSelector) -> Self {
        self.selectors = Some(selectors);
        self
    }

    /// Attach an initialized status with the given results
    pub fn with_results(mut self, results: Vec<TestResult>) -> Self {
        self.status = Some(TestSuiteStatus {
            phase: if results.iter().any(|r| !r.executions.is_empty()) {
                SuitePhase::Running
            } else {
                SuitePhase::Pending
            },
            start_time: Some("2024-05-01T11:00:00+00:00".to_string()),
            completion_time: None,
            results,
        });
        self
    }

    pub fn with_status(mut self, status: TestSuiteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn build(self) -> TestSuite {
        TestSuite {
            metadata: ObjectMeta {
                name: Some(self.name),
                uid: Some("suite-uid-12345".to_string()),
                ..Default::default()
            },
            spec: TestSuiteSpec {
                count: self.count,
                selectors: self.selectors,
            },
            status: self.status,
        }
    }
}

// =============================================================================
// In-memory DefinitionsService
// =============================================================================

/// Definition lookup backed by a fixed list, for exercising the scheduler
/// without an API server
pub struct StaticDefinitions {
    definitions: Vec<TestDefinition>,
}

impl StaticDefinitions {
    pub fn new(definitions: Vec<TestDefinition>) -> Self {
        Self { definitions }
    }
}

#[async_trait]
impl DefinitionsService for StaticDefinitions {
    async fn find_matching(&self, suite: &TestSuite) -> Result<Vec<TestDefinition>> {
        let mut matched: Vec<TestDefinition> = self
            .definitions
            .iter()
            .filter(|def| definition_matches(suite, def))
            .cloned()
            .collect();
        matched.sort_by_key(|def| (def.namespace().unwrap_or_default(), def.name_any()));
        Ok(matched)
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<TestDefinition> {
        self.definitions
            .iter()
            .find(|def| {
                def.name_any() == name && def.namespace().as_deref() == Some(namespace)
            })
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{}/{}", namespace, name)))
    }
}
