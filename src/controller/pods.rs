//! Pod observation and creation
//!
//! Pods are correlated to suites purely through the label schema in
//! `resources::common`; listing is cluster-wide because a suite's tests may
//! live in any namespace.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, PostParams};
use kube::{Api, Client, ResourceExt};
use tracing::debug;

use crate::controller::error::{Error, Result};
use crate::crd::TestSuite;
use crate::resources::common::suite_pod_selector;

/// Reports the pods backing a suite's executions
#[async_trait]
pub trait PodReporter: Send + Sync {
    /// Every pod launched for the suite, across all namespaces
    async fn pods_for_suite(&self, suite: &TestSuite) -> Result<Vec<Pod>>;
}

/// Creates execution pods
#[async_trait]
pub trait PodCreator: Send + Sync {
    async fn create(&self, pod: &Pod) -> Result<()>;
}

/// Kubernetes-backed pod access
pub struct KubePods {
    client: Client,
}

impl KubePods {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodReporter for KubePods {
    async fn pods_for_suite(&self, suite: &TestSuite) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let params = ListParams::default().labels(&suite_pod_selector(&suite.name_any()));
        Ok(api.list(&params).await?.items)
    }
}

#[async_trait]
impl PodCreator for KubePods {
    async fn create(&self, pod: &Pod) -> Result<()> {
        let namespace = pod
            .metadata
            .namespace
            .as_deref()
            .ok_or(Error::MissingObjectKey("metadata.namespace"))?;
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);

        match api.create(&PostParams::default(), pod).await {
            Ok(_) => Ok(()),
            // Pod identity is deterministic per execution slot; a conflict
            // means the slot is already backed by a pod
            Err(kube::Error::Api(e)) if e.code == 409 => {
                debug!(pod = %pod.name_any(), "execution pod already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
