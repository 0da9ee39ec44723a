//! Shared constants and helpers for generated resources
//!
//! The label schema defined here is load-bearing: pod listing for a suite
//! filters on `created-by` and `suite-name`, so the keys must stay stable.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;

use crate::crd::TestSuite;

/// API version for the testing CRDs
pub const API_VERSION: &str = "testing.example.com/v1alpha1";

/// Kind for the TestSuite CRD
pub const KIND: &str = "TestSuite";

/// Operator field manager name for status patches
pub const FIELD_MANAGER: &str = "testsuite-operator";

/// Marker applied to every pod this operator creates
pub const LABEL_CREATED_BY: &str = "testing.example.com/created-by";

/// Suite identity carried on every execution pod
pub const LABEL_SUITE_NAME: &str = "testing.example.com/suite-name";

/// Test identity carried on every execution pod
pub const LABEL_TEST_NAME: &str = "testing.example.com/test-name";

/// Generate an owner reference for a TestSuite.
///
/// Execution pods are owned by their suite so that deleting the suite
/// garbage-collects every pod it launched.
pub fn owner_reference(suite: &TestSuite) -> OwnerReference {
    OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: KIND.to_string(),
        name: suite.name_any(),
        uid: suite.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Correlation labels for one execution pod
pub fn execution_labels(suite_name: &str, test_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_CREATED_BY.to_string(), FIELD_MANAGER.to_string()),
        (LABEL_SUITE_NAME.to_string(), suite_name.to_string()),
        (LABEL_TEST_NAME.to_string(), test_name.to_string()),
    ])
}

/// Label selector matching every pod launched for the given suite
pub fn suite_pod_selector(suite_name: &str) -> String {
    format!(
        "{}={},{}={}",
        LABEL_CREATED_BY, FIELD_MANAGER, LABEL_SUITE_NAME, suite_name
    )
}
