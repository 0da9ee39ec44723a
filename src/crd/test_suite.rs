use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// TestSuite is the Schema for the testsuites API
///
/// A suite selects a set of TestDefinition resources and runs each of them
/// `count` times by launching one workload pod per execution. The suite is
/// cluster-scoped; the tests it matches may live in any namespace.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "testing.example.com",
    version = "v1alpha1",
    kind = "TestSuite",
    plural = "testsuites",
    shortname = "ts",
    status = "TestSuiteStatus",
    printcolumn = r#"{"name":"Count", "type":"integer", "jsonPath":".spec.count"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteSpec {
    /// How many times every matched test must be executed
    #[serde(default = "default_count")]
    pub count: i64,

    /// Criteria for matching TestDefinition resources.
    /// An absent or empty selector matches every definition in the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<TestsSelector>,
}

fn default_count() -> i64 {
    1
}

/// Selection criteria for TestDefinition resources.
///
/// A definition matches if it is named by `matchNames` or if its labels are
/// a superset of `matchLabels`. Both lists empty means "match all".
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestsSelector {
    /// Definitions selected by exact name and namespace
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_names: Vec<TestDefinitionReference>,

    /// Definitions selected by label subset match
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

/// Reference to a single TestDefinition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinitionReference {
    pub name: String,
    pub namespace: String,
}

/// Status of a TestSuite.
///
/// `results` is the suite's only externally observable artifact: an ordered
/// list with one entry per matched definition, each carrying the ordered
/// executions attempted so far. The list order is fixed at initialization.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteStatus {
    /// Derived phase of the whole suite
    #[serde(default)]
    pub phase: SuitePhase,

    /// When the suite was initialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// When the last execution reached a terminal phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,

    /// Per-definition execution records, in initialization order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<TestResult>,
}

/// Execution record for one matched TestDefinition
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Name of the matched definition
    pub name: String,

    /// Namespace of the matched definition (and of its execution pods)
    pub namespace: String,

    /// Copied from the definition: this test never runs alongside other
    /// concurrency-disabled tests
    #[serde(default)]
    pub disable_concurrency: bool,

    /// Attempts made so far, oldest first; never exceeds `spec.count`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executions: Vec<Execution>,
}

/// One attempt at running a test: exactly one workload pod
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Deterministic identifier; doubles as the pod name
    pub id: String,

    /// Last observed phase of the backing pod
    pub phase: ExecutionPhase,

    /// When the pod was observed running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// When the pod reached a terminal phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,
}

/// Phase of a single execution
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum ExecutionPhase {
    /// Pod has been created but is not running yet
    #[default]
    Scheduled,
    /// Pod is running
    Running,
    /// Pod terminated successfully
    Succeeded,
    /// Pod terminated with a failure
    Failed,
}

impl ExecutionPhase {
    /// Terminal phases never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionPhase::Succeeded | ExecutionPhase::Failed)
    }

    /// Ordering used to guarantee phases only ever advance
    pub(crate) fn rank(&self) -> u8 {
        match self {
            ExecutionPhase::Scheduled => 0,
            ExecutionPhase::Running => 1,
            ExecutionPhase::Succeeded | ExecutionPhase::Failed => 2,
        }
    }
}

impl std::fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionPhase::Scheduled => write!(f, "Scheduled"),
            ExecutionPhase::Running => write!(f, "Running"),
            ExecutionPhase::Succeeded => write!(f, "Succeeded"),
            ExecutionPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Derived suite lifecycle phase
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum SuitePhase {
    /// Initialized, nothing executed yet
    #[default]
    Pending,
    /// At least one execution exists and the suite is not finished
    Running,
    /// Finished with every execution succeeded
    Succeeded,
    /// Finished with at least one failed execution
    Failed,
}

impl SuitePhase {
    /// Terminal phases never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, SuitePhase::Succeeded | SuitePhase::Failed)
    }
}

impl std::fmt::Display for SuitePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuitePhase::Pending => write!(f, "Pending"),
            SuitePhase::Running => write!(f, "Running"),
            SuitePhase::Succeeded => write!(f, "Succeeded"),
            SuitePhase::Failed => write!(f, "Failed"),
        }
    }
}

impl TestResult {
    /// Whether this test still owes executions under the given repeat count.
    /// A record at or above the count is full; above can only happen on a
    /// malformed status and is treated the same as full.
    pub fn has_pending_executions(&self, count: i64) -> bool {
        (self.executions.len() as i64) < count
    }

    /// Whether an execution of this test is currently scheduled or running
    pub fn has_inflight_execution(&self) -> bool {
        self.executions.iter().any(|e| !e.phase.is_terminal())
    }
}
