//! TestDefinition lookup

use async_trait::async_trait;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};

use crate::controller::error::Result;
use crate::crd::{TestDefinition, TestSuite};

/// Resolves the definitions a suite should run
#[async_trait]
pub trait DefinitionsService: Send + Sync {
    /// All definitions matching the suite's selectors, in deterministic
    /// order (the order initialization will preserve)
    async fn find_matching(&self, suite: &TestSuite) -> Result<Vec<TestDefinition>>;

    /// Fetch one definition by name and namespace
    async fn get(&self, name: &str, namespace: &str) -> Result<TestDefinition>;
}

/// Kubernetes-backed definition lookup
pub struct KubeDefinitions {
    client: Client,
}

impl KubeDefinitions {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DefinitionsService for KubeDefinitions {
    async fn find_matching(&self, suite: &TestSuite) -> Result<Vec<TestDefinition>> {
        let api: Api<TestDefinition> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        let mut matched: Vec<TestDefinition> = list
            .items
            .into_iter()
            .filter(|def| definition_matches(suite, def))
            .collect();
        // Fix the ordering here so the result list written at
        // initialization does not depend on API server iteration order
        matched.sort_by_key(|def| (def.namespace().unwrap_or_default(), def.name_any()));

        Ok(matched)
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<TestDefinition> {
        let api: Api<TestDefinition> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }
}

/// Whether a definition is selected by the suite.
///
/// Absent or empty selectors match every definition in the cluster. With
/// selectors present, a definition matches if it is named in `match_names`
/// or if its labels are a superset of `match_labels`.
pub fn definition_matches(suite: &TestSuite, definition: &TestDefinition) -> bool {
    let Some(selectors) = &suite.spec.selectors else {
        return true;
    };
    if selectors.match_names.is_empty() && selectors.match_labels.is_empty() {
        return true;
    }

    let name = definition.name_any();
    let namespace = definition.namespace().unwrap_or_default();
    if selectors
        .match_names
        .iter()
        .any(|r| r.name == name && r.namespace == namespace)
    {
        return true;
    }

    if !selectors.match_labels.is_empty() {
        let labels = definition.labels();
        if selectors
            .match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
        {
            return true;
        }
    }

    false
}
