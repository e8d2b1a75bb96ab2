use tracing::info;

use gkectl_core::cluster::{ClusterSpec, ClusterStatus, ClusterSummary, PoolNodes};
use gkectl_core::error::ApiError;
use gkectl_core::operation::{OperationHandle, OperationReport, OperationStatus};
use gkectl_core::plane::ControlPlane;

use crate::http::Http;
use crate::models::{
    Cluster, ClusterConfig, CostManagementConfig, CreateClusterBody, ListClustersResponse,
    ManagedPrometheusConfig, MonitoringConfig, NodePoolConfig, NodeSettings, Operation,
    PrivateClusterConfig, ReleaseChannel, SetNodePoolSizeBody, TaintConfig,
    WorkloadIdentityConfig,
};

const BASE: &str = "https://container.googleapis.com/v1";

/// Client for the cluster manager API: cluster and node-pool CRUD plus
/// operation lookups, scoped to one project and location.
pub struct ContainerClient {
    http: Http,
    project: String,
    location: String,
}

impl ContainerClient {
    pub fn new(token: &str, project: &str, location: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Http::new(token)?,
            project: project.to_string(),
            location: location.to_string(),
        })
    }

    fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }

    fn clusters_url(&self) -> String {
        format!("{}/{}/clusters", BASE, self.parent())
    }

    fn cluster_url(&self, name: &str) -> String {
        format!("{}/{}", self.clusters_url(), name)
    }

    fn op_scope(&self) -> String {
        format!("locations/{}", self.location)
    }

    fn handle(&self, op: &Operation) -> OperationHandle {
        OperationHandle::new(
            OperationHandle::id_from_name(&op.name),
            op.operation_type.as_deref().unwrap_or(""),
            op.target_link.as_deref().unwrap_or(""),
            &self.op_scope(),
        )
    }
}

/// Collapse a cluster resource into the read-only summary view.
fn summary_from(cluster: &Cluster, fallback_zone: &str) -> ClusterSummary {
    ClusterSummary {
        name: cluster.name.clone(),
        zone: cluster
            .location
            .clone()
            .or_else(|| cluster.zone.clone())
            .unwrap_or_else(|| fallback_zone.to_string()),
        status: ClusterStatus::parse(&cluster.status),
        endpoint: cluster.endpoint.clone(),
        created: cluster.create_time.clone(),
        pools: cluster
            .node_pools
            .iter()
            .map(|p| PoolNodes {
                name: p.name.clone(),
                nodes: p.initial_node_count.unwrap_or(0),
            })
            .collect(),
    }
}

/// Interpret one operation observation. `statusMessage`/`error` are only set
/// by the control plane on failure, so their presence means failed even when
/// the status already reads DONE.
fn report_from(op: &Operation) -> OperationReport {
    let status = OperationStatus::parse(&op.status);
    let error = op
        .error
        .as_ref()
        .and_then(|e| e.message.clone())
        .or_else(|| op.status_message.clone().filter(|m| !m.is_empty()))
        .or_else(|| {
            (status == OperationStatus::Aborting).then(|| "operation aborted".to_string())
        });
    OperationReport { status, error }
}

fn build_create_body(spec: &ClusterSpec) -> CreateClusterBody {
    CreateClusterBody {
        cluster: ClusterConfig {
            name: spec.name.clone(),
            locations: vec![spec.zone.clone()],
            node_pools: spec
                .pools
                .iter()
                .map(|p| NodePoolConfig {
                    name: p.name.clone(),
                    initial_node_count: p.initial_node_count,
                    config: NodeSettings {
                        machine_type: p.machine_type.clone(),
                        disk_size_gb: p.disk_size_gb,
                        disk_type: p.disk_type.clone(),
                        image_type: p.image_type.clone(),
                        spot: spec.spot,
                        labels: p.labels.clone(),
                        taints: p
                            .taints
                            .iter()
                            .map(|t| TaintConfig {
                                key: t.key.clone(),
                                value: t.value.clone(),
                                effect: t.effect.clone(),
                            })
                            .collect(),
                    },
                    autoscaling: p.autoscaling.map(|a| crate::models::AutoscalingConfig {
                        enabled: true,
                        min_node_count: a.min_nodes,
                        max_node_count: a.max_nodes,
                    }),
                })
                .collect(),
            release_channel: spec
                .release_channel
                .clone()
                .map(|channel| ReleaseChannel { channel }),
            private_cluster_config: spec
                .private_nodes
                .then_some(PrivateClusterConfig {
                    enable_private_nodes: true,
                }),
            monitoring_config: Some(MonitoringConfig {
                managed_prometheus_config: ManagedPrometheusConfig {
                    enabled: spec.managed_prometheus,
                },
            }),
            cost_management_config: Some(CostManagementConfig {
                enabled: spec.cost_allocation,
            }),
            workload_identity_config: spec
                .workload_pool
                .clone()
                .map(|workload_pool| WorkloadIdentityConfig { workload_pool }),
        },
    }
}

impl ControlPlane for ContainerClient {
    fn create_cluster(&self, spec: &ClusterSpec) -> Result<OperationHandle, ApiError> {
        info!(cluster = %spec.name, zone = %spec.zone, "submitting cluster create");
        let body = build_create_body(spec);
        let op: Operation = self.http.post(&self.clusters_url(), &body)?;
        Ok(self.handle(&op))
    }

    fn get_cluster(&self, name: &str) -> Result<ClusterSummary, ApiError> {
        let cluster: Cluster = self.http.get(&self.cluster_url(name), &[])?;
        Ok(summary_from(&cluster, &self.location))
    }

    fn list_clusters(&self) -> Result<Vec<ClusterSummary>, ApiError> {
        let resp: ListClustersResponse = self.http.get(&self.clusters_url(), &[])?;
        Ok(resp
            .clusters
            .iter()
            .map(|c| summary_from(c, &self.location))
            .collect())
    }

    fn delete_cluster(&self, name: &str) -> Result<OperationHandle, ApiError> {
        info!(cluster = %name, "submitting cluster delete");
        let op: Operation = self.http.delete(&self.cluster_url(name))?;
        Ok(self.handle(&op))
    }

    fn resize_node_pool(
        &self,
        cluster: &str,
        pool: &str,
        node_count: i32,
    ) -> Result<OperationHandle, ApiError> {
        info!(cluster = %cluster, pool = %pool, node_count, "submitting node pool resize");
        let url = format!("{}/nodePools/{}:setSize", self.cluster_url(cluster), pool);
        let op: Operation = self.http.post(&url, &SetNodePoolSizeBody { node_count })?;
        Ok(self.handle(&op))
    }

    fn operation_status(&self, op: &OperationHandle) -> Result<OperationReport, ApiError> {
        let url = format!(
            "{}/projects/{}/{}/operations/{}",
            BASE, self.project, op.scope, op.id
        );
        let wire: Operation = self.http.get(&url, &[])?;
        Ok(report_from(&wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gkectl_core::cluster::PoolAutoscaling;

    fn spec() -> ClusterSpec {
        ClusterSpec::cost_optimized("t1", "my-proj", "us-central1-b", true)
    }

    #[test]
    fn test_create_body_from_spec() {
        let body = build_create_body(&spec());
        let cluster = &body.cluster;
        assert_eq!(cluster.name, "t1");
        assert_eq!(cluster.locations, vec!["us-central1-b".to_string()]);
        assert_eq!(cluster.node_pools.len(), 1);
        assert!(cluster.node_pools[0].config.spot);
        assert_eq!(cluster.node_pools[0].initial_node_count, 0);
        assert!(cluster.private_cluster_config.is_none());
        assert_eq!(
            cluster
                .workload_identity_config
                .as_ref()
                .map(|w| w.workload_pool.as_str()),
            Some("my-proj.svc.id.goog")
        );
    }

    #[test]
    fn test_create_body_private_and_autoscaling() {
        let mut s = spec();
        s.private_nodes = true;
        s.pools[0].autoscaling = Some(PoolAutoscaling {
            min_nodes: 0,
            max_nodes: 5,
        });
        let body = build_create_body(&s);
        assert!(
            body.cluster
                .private_cluster_config
                .as_ref()
                .is_some_and(|p| p.enable_private_nodes)
        );
        let auto = body.cluster.node_pools[0].autoscaling.as_ref().unwrap();
        assert!(auto.enabled);
        assert_eq!(auto.max_node_count, 5);
    }

    #[test]
    fn test_summary_from_wire() {
        let json = r#"{
            "name": "t1",
            "location": "us-central1-b",
            "status": "PROVISIONING",
            "nodePools": [{"name": "default-pool", "initialNodeCount": 3}]
        }"#;
        let cluster: Cluster = serde_json::from_str(json).unwrap();
        let summary = summary_from(&cluster, "fallback-zone");
        assert_eq!(summary.zone, "us-central1-b");
        assert_eq!(summary.status, ClusterStatus::Provisioning);
        assert_eq!(summary.total_nodes(), 3);
    }

    #[test]
    fn test_report_done_clean() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "operation-1", "status": "DONE"}"#).unwrap();
        let report = report_from(&op);
        assert_eq!(report.status, OperationStatus::Done);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_done_with_error_is_failure() {
        let op: Operation = serde_json::from_str(
            r#"{"name": "operation-1", "status": "DONE", "error": {"message": "quota exceeded"}}"#,
        )
        .unwrap();
        let report = report_from(&op);
        assert_eq!(report.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_report_aborting_without_message() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "operation-1", "status": "ABORTING"}"#).unwrap();
        let report = report_from(&op);
        assert_eq!(report.status, OperationStatus::Aborting);
        assert_eq!(report.error.as_deref(), Some("operation aborted"));
    }
}
