use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// TestDefinition is the Schema for the testdefinitions API
///
/// A definition is a reusable, namespaced pod template describing how to run
/// one test. Suites match definitions by name or label and launch one pod
/// from the template per execution.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "testing.example.com",
    version = "v1alpha1",
    kind = "TestDefinition",
    plural = "testdefinitions",
    shortname = "td",
    namespaced,
    printcolumn = r#"{"name":"Sequential", "type":"boolean", "jsonPath":".spec.disableConcurrency"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinitionSpec {
    /// Pod template the suite instantiates for every execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,

    /// When true, executions of this test never overlap with executions of
    /// other concurrency-disabled tests in the same suite
    #[serde(default)]
    pub disable_concurrency: bool,
}
