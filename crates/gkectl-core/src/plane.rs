use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterSpec, ClusterSummary, NetworkingSpec};
use crate::error::ApiError;
use crate::operation::{OperationHandle, OperationReport};

/// A persistent disk associated with a cluster (PV-backed storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskRef {
    pub name: String,
    /// Still attached to an instance. Attached disks are released by the
    /// cluster teardown itself and cannot be deleted directly.
    pub attached: bool,
    pub size_gb: i64,
}

/// The managed container-orchestration control plane: cluster and node-pool
/// CRUD plus operation polling. Implementations are stateless clients; the
/// remote service owns all state.
pub trait ControlPlane {
    fn create_cluster(&self, spec: &ClusterSpec) -> Result<OperationHandle, ApiError>;

    fn get_cluster(&self, name: &str) -> Result<ClusterSummary, ApiError>;

    fn list_clusters(&self) -> Result<Vec<ClusterSummary>, ApiError>;

    fn delete_cluster(&self, name: &str) -> Result<OperationHandle, ApiError>;

    fn resize_node_pool(
        &self,
        cluster: &str,
        pool: &str,
        node_count: i32,
    ) -> Result<OperationHandle, ApiError>;

    fn operation_status(&self, op: &OperationHandle) -> Result<OperationReport, ApiError>;
}

/// The managed networking control plane: router/NAT-gateway CRUD and the
/// cluster's persistent disks.
pub trait NetworkPlane {
    /// Provision a router carrying one NAT gateway. Must complete before a
    /// private cluster's pods gain outbound connectivity.
    fn create_router_with_nat(&self, net: &NetworkingSpec) -> Result<OperationHandle, ApiError>;

    /// Number of NAT gateways currently configured on the router; 0 when the
    /// router does not exist.
    fn nat_gateway_count(&self, net: &NetworkingSpec) -> Result<usize, ApiError>;

    /// Delete the router (and its NAT configs with it). NotFound when no
    /// router was ever provisioned for this cluster.
    fn delete_router(&self, net: &NetworkingSpec) -> Result<OperationHandle, ApiError>;

    /// Disks labeled as belonging to the named cluster.
    fn list_cluster_disks(&self, cluster: &str) -> Result<Vec<DiskRef>, ApiError>;

    fn delete_disk(&self, disk: &DiskRef) -> Result<OperationHandle, ApiError>;

    fn operation_status(&self, op: &OperationHandle) -> Result<OperationReport, ApiError>;
}
