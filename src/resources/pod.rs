//! Execution pod construction
//!
//! Every execution of a test is backed by exactly one pod, built from the
//! TestDefinition's template. The pod name is derived from the suite, the
//! test, and the execution index, so retrying the same slot produces the
//! same pod identity and a duplicate create fails with AlreadyExists
//! instead of launching a second pod.

use k8s_openapi::api::core::v1::{Pod, PodSpec};
use kube::ResourceExt;
use kube::core::ObjectMeta;

use crate::crd::{TestDefinition, TestSuite};
use crate::resources::common::{execution_labels, owner_reference};

/// Deterministic pod name (and execution id) for one execution slot
pub fn execution_id(suite_name: &str, test_name: &str, index: usize) -> String {
    format!("{}-{}-{}", suite_name, test_name, index)
}

/// Build the pod for one execution of a test.
///
/// The template's own labels are kept; correlation labels win on conflict.
/// Test pods run to completion, so the restart policy defaults to `Never`
/// unless the template sets one explicitly.
pub fn execution_pod(suite: &TestSuite, definition: &TestDefinition, index: usize) -> Pod {
    let suite_name = suite.name_any();
    let test_name = definition.name_any();
    let namespace = definition.namespace();

    let template = definition.spec.template.clone().unwrap_or_default();

    let mut labels = template
        .metadata
        .as_ref()
        .and_then(|m| m.labels.clone())
        .unwrap_or_default();
    labels.extend(execution_labels(&suite_name, &test_name));

    let mut spec = template.spec.unwrap_or_else(PodSpec::default);
    if spec.restart_policy.is_none() {
        spec.restart_policy = Some("Never".to_string());
    }

    Pod {
        metadata: ObjectMeta {
            name: Some(execution_id(&suite_name, &test_name, index)),
            namespace,
            labels: Some(labels),
            annotations: template.metadata.as_ref().and_then(|m| m.annotations.clone()),
            owner_references: Some(vec![owner_reference(suite)]),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}
