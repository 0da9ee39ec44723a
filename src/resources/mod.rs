pub mod common;
pub mod pod;

pub use common::{
    API_VERSION, FIELD_MANAGER, KIND, LABEL_CREATED_BY, LABEL_SUITE_NAME, LABEL_TEST_NAME,
    execution_labels, owner_reference, suite_pod_selector,
};
pub use pod::{execution_id, execution_pod};
