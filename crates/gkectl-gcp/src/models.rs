//! Wire models for the container and compute APIs. Read models only keep the
//! fields the lifecycle manager consumes; write models serialize with
//! camelCase keys and omit unset optionals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Container API — read models
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    /// Zone or region the cluster lives in.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub node_pools: Vec<NodePool>,
    #[serde(default)]
    pub current_node_count: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePool {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub initial_node_count: Option<i32>,
    #[serde(default)]
    pub config: Option<NodeConfig>,
    #[serde(default)]
    pub autoscaling: Option<NodePoolAutoscaling>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub disk_size_gb: Option<i32>,
    #[serde(default)]
    pub disk_type: Option<String>,
    #[serde(default)]
    pub spot: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolAutoscaling {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub min_node_count: Option<i32>,
    #[serde(default)]
    pub max_node_count: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClustersResponse {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

/// An asynchronous container-API mutation. `statusMessage` and `error` are
/// only populated on failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub target_link: Option<String>,
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Container API — write models
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterBody {
    pub cluster: ClusterConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub name: String,
    pub locations: Vec<String>,
    pub node_pools: Vec<NodePoolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_channel: Option<ReleaseChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_cluster_config: Option<PrivateClusterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_config: Option<MonitoringConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_management_config: Option<CostManagementConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_identity_config: Option<WorkloadIdentityConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseChannel {
    pub channel: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateClusterConfig {
    pub enable_private_nodes: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringConfig {
    pub managed_prometheus_config: ManagedPrometheusConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedPrometheusConfig {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostManagementConfig {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentityConfig {
    pub workload_pool: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolConfig {
    pub name: String,
    pub initial_node_count: i32,
    pub config: NodeSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<AutoscalingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSettings {
    pub machine_type: String,
    pub disk_size_gb: i32,
    pub disk_type: String,
    pub image_type: String,
    pub spot: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<TaintConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintConfig {
    pub key: String,
    pub value: String,
    pub effect: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingConfig {
    pub enabled: bool,
    pub min_node_count: i32,
    pub max_node_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNodePoolSizeBody {
    pub node_count: i32,
}

// ============================================================================
// Compute API — routers, NAT, disks
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nats: Vec<RouterNat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterNat {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_ip_allocate_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_subnetwork_ip_ranges_to_nat: Option<String>,
}

/// Compute operations have no ABORTING state; failure is signaled by the
/// `error` block (or `httpErrorMessage`) on a DONE operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeOperation {
    pub name: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub http_error_message: Option<String>,
    #[serde(default)]
    pub target_link: Option<String>,
    #[serde(default)]
    pub error: Option<ComputeOperationError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeOperationError {
    #[serde(default)]
    pub errors: Vec<ComputeOperationErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeOperationErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Persistent disk. `sizeGb` arrives as a decimal string (int64 on the wire).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub name: String,
    #[serde(default)]
    pub size_gb: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskListResponse {
    #[serde(default)]
    pub items: Vec<Disk>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_deserializes_sparse_response() {
        let json = r#"{
            "name": "t1",
            "location": "us-central1-b",
            "status": "RUNNING",
            "endpoint": "34.2.3.4",
            "nodePools": [
                {"name": "default-pool", "initialNodeCount": 0, "status": "RUNNING"}
            ]
        }"#;
        let cluster: Cluster = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.name, "t1");
        assert_eq!(cluster.status, "RUNNING");
        assert_eq!(cluster.node_pools.len(), 1);
        assert_eq!(cluster.node_pools[0].initial_node_count, Some(0));
        assert!(cluster.create_time.is_none());
    }

    #[test]
    fn test_empty_list_response() {
        let resp: ListClustersResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.clusters.is_empty());
    }

    #[test]
    fn test_operation_with_error() {
        let json = r#"{
            "name": "operation-123",
            "operationType": "CREATE_CLUSTER",
            "status": "DONE",
            "statusMessage": "Insufficient quota",
            "error": {"code": 8, "message": "Insufficient quota"}
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.status, "DONE");
        assert_eq!(op.error.unwrap().message.as_deref(), Some("Insufficient quota"));
    }

    #[test]
    fn test_create_body_uses_camel_case_and_skips_unset() {
        let body = CreateClusterBody {
            cluster: ClusterConfig {
                name: "t1".to_string(),
                locations: vec!["us-central1-b".to_string()],
                node_pools: vec![NodePoolConfig {
                    name: "default-pool".to_string(),
                    initial_node_count: 0,
                    config: NodeSettings {
                        machine_type: "e2-standard-2".to_string(),
                        disk_size_gb: 20,
                        disk_type: "pd-standard".to_string(),
                        image_type: "COS_CONTAINERD".to_string(),
                        spot: true,
                        labels: BTreeMap::new(),
                        taints: Vec::new(),
                    },
                    autoscaling: None,
                }],
                release_channel: None,
                private_cluster_config: None,
                monitoring_config: Some(MonitoringConfig {
                    managed_prometheus_config: ManagedPrometheusConfig { enabled: false },
                }),
                cost_management_config: Some(CostManagementConfig { enabled: true }),
                workload_identity_config: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"initialNodeCount\":0"));
        assert!(json.contains("\"machineType\":\"e2-standard-2\""));
        assert!(json.contains("\"diskSizeGb\":20"));
        assert!(json.contains("\"managedPrometheusConfig\":{\"enabled\":false}"));
        assert!(!json.contains("releaseChannel"));
        assert!(!json.contains("labels"));
        assert!(!json.contains("privateClusterConfig"));
    }

    #[test]
    fn test_router_insert_body() {
        let router = Router {
            name: "t1-router".to_string(),
            network: Some("projects/p/global/networks/default".to_string()),
            nats: vec![RouterNat {
                name: "t1-nat".to_string(),
                nat_ip_allocate_option: Some("AUTO_ONLY".to_string()),
                source_subnetwork_ip_ranges_to_nat: Some(
                    "ALL_SUBNETWORKS_ALL_IP_RANGES".to_string(),
                ),
            }],
        };
        let json = serde_json::to_string(&router).unwrap();
        assert!(json.contains("\"natIpAllocateOption\":\"AUTO_ONLY\""));
        assert!(json.contains("\"sourceSubnetworkIpRangesToNat\""));
    }

    #[test]
    fn test_disk_size_is_a_string_on_the_wire() {
        let json = r#"{
            "name": "pvc-3c1d",
            "sizeGb": "20",
            "users": ["projects/p/zones/z/instances/node-1"],
            "labels": {"goog-k8s-cluster-name": "t1"}
        }"#;
        let disk: Disk = serde_json::from_str(json).unwrap();
        assert_eq!(disk.size_gb.as_deref(), Some("20"));
        assert_eq!(disk.users.len(), 1);
    }

    #[test]
    fn test_compute_operation_failure_shape() {
        let json = r#"{
            "name": "operation-999",
            "status": "DONE",
            "httpErrorMessage": "CONFLICT",
            "error": {"errors": [{"code": "RESOURCE_IN_USE_BY_ANOTHER_RESOURCE", "message": "router is in use"}]}
        }"#;
        let op: ComputeOperation = serde_json::from_str(json).unwrap();
        let err = op.error.unwrap();
        assert_eq!(err.errors[0].message.as_deref(), Some("router is in use"));
    }
}
