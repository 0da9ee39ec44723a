pub mod context;
pub mod definitions;
pub mod error;
pub mod pods;
pub mod reconciler;
pub mod scheduler;
pub mod status;
pub mod strategy;

pub use context::Context;
pub use definitions::{DefinitionsService, KubeDefinitions, definition_matches};
pub use error::{BackoffConfig, Error, Result};
pub use pods::{KubePods, PodCreator, PodReporter};
pub use reconciler::{REQUEUE_INTERVAL, error_policy, reconcile};
pub use scheduler::Scheduler;
pub use status::{Clock, StatusService, SystemClock, derive_phase};
pub use strategy::{RepeatStrategy, RepeatUntilCount};
