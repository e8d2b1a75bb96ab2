// gkectl-lifecycle: create/scale/list/delete orchestration over the
// control-plane trait seams, with bounded polling.

pub mod manager;

pub use manager::{ClusterList, LifecycleManager};
