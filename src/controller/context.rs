use std::sync::Arc;

use kube::Client;

use crate::controller::definitions::{DefinitionsService, KubeDefinitions};
use crate::controller::pods::{KubePods, PodCreator, PodReporter};
use crate::controller::scheduler::Scheduler;
use crate::controller::status::{StatusService, SystemClock};
use crate::controller::strategy::RepeatUntilCount;

/// Shared context for the controller
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// State predicates and status aggregation
    pub status: StatusService,
    /// Launch decisions
    pub scheduler: Scheduler,
    /// Definition resolution
    pub definitions: Arc<dyn DefinitionsService>,
    /// Pod observation
    pub pods: Arc<dyn PodReporter>,
    /// Pod creation
    pub pod_creator: Arc<dyn PodCreator>,
}

impl Context {
    pub fn new(client: Client) -> Self {
        let definitions: Arc<dyn DefinitionsService> =
            Arc::new(KubeDefinitions::new(client.clone()));
        let pods = Arc::new(KubePods::new(client.clone()));
        Self {
            status: StatusService::new(Arc::new(SystemClock)),
            scheduler: Scheduler::new(Arc::new(RepeatUntilCount), definitions.clone()),
            definitions,
            pods: pods.clone(),
            pod_creator: pods,
            client,
        }
    }
}
