use tracing::info;

use gkectl_core::cluster::NetworkingSpec;
use gkectl_core::error::ApiError;
use gkectl_core::operation::{OperationHandle, OperationReport, OperationStatus};
use gkectl_core::plane::{DiskRef, NetworkPlane};

use crate::http::Http;
use crate::models::{ComputeOperation, Disk, DiskListResponse, Router, RouterNat};

const BASE: &str = "https://compute.googleapis.com/compute/v1";

/// Label the cluster manager puts on PV-backed persistent disks.
const CLUSTER_LABEL: &str = "goog-k8s-cluster-name";

/// Client for the compute API: Cloud Routers (carrying NAT gateways) in the
/// cluster's region and persistent disks in its zone. Router calls take
/// their region from the NetworkingSpec they act on.
pub struct ComputeClient {
    http: Http,
    project: String,
    zone: String,
}

impl ComputeClient {
    pub fn new(token: &str, project: &str, zone: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Http::new(token)?,
            project: project.to_string(),
            zone: zone.to_string(),
        })
    }

    fn routers_url(&self, region: &str) -> String {
        format!("{}/projects/{}/regions/{}/routers", BASE, self.project, region)
    }

    fn disks_url(&self) -> String {
        format!("{}/projects/{}/zones/{}/disks", BASE, self.project, self.zone)
    }

    fn region_handle(&self, op: &ComputeOperation, region: &str) -> OperationHandle {
        handle_from(op, &format!("regions/{}", region))
    }

    fn zone_handle(&self, op: &ComputeOperation) -> OperationHandle {
        handle_from(op, &format!("zones/{}", self.zone))
    }
}

fn handle_from(op: &ComputeOperation, scope: &str) -> OperationHandle {
    OperationHandle::new(
        OperationHandle::id_from_name(&op.name),
        op.operation_type.as_deref().unwrap_or(""),
        op.target_link.as_deref().unwrap_or(""),
        scope,
    )
}

/// Compute signals failure through the `error` block on an otherwise DONE
/// operation; collapse it to one diagnostic line, verbatim messages joined.
fn report_from(op: &ComputeOperation) -> OperationReport {
    let status = OperationStatus::parse(&op.status);
    let error = op
        .error
        .as_ref()
        .map(|e| {
            e.errors
                .iter()
                .filter_map(|item| item.message.clone())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|joined| !joined.is_empty())
        .or_else(|| op.http_error_message.clone().filter(|m| !m.is_empty()));
    OperationReport { status, error }
}

impl NetworkPlane for ComputeClient {
    fn create_router_with_nat(&self, net: &NetworkingSpec) -> Result<OperationHandle, ApiError> {
        info!(router = %net.router, nat = %net.nat, region = %net.region, "creating router with NAT gateway");
        let body = Router {
            name: net.router.clone(),
            network: Some(format!(
                "projects/{}/global/networks/default",
                self.project
            )),
            nats: vec![RouterNat {
                name: net.nat.clone(),
                nat_ip_allocate_option: Some("AUTO_ONLY".to_string()),
                source_subnetwork_ip_ranges_to_nat: Some(
                    "ALL_SUBNETWORKS_ALL_IP_RANGES".to_string(),
                ),
            }],
        };
        let op: ComputeOperation = self.http.post(&self.routers_url(&net.region), &body)?;
        Ok(self.region_handle(&op, &net.region))
    }

    fn nat_gateway_count(&self, net: &NetworkingSpec) -> Result<usize, ApiError> {
        let url = format!("{}/{}", self.routers_url(&net.region), net.router);
        match self.http.get::<Router>(&url, &[]) {
            Ok(router) => Ok(router.nats.len()),
            Err(ApiError::NotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn delete_router(&self, net: &NetworkingSpec) -> Result<OperationHandle, ApiError> {
        info!(router = %net.router, region = %net.region, "deleting router");
        let url = format!("{}/{}", self.routers_url(&net.region), net.router);
        let op: ComputeOperation = self.http.delete(&url)?;
        Ok(self.region_handle(&op, &net.region))
    }

    fn list_cluster_disks(&self, cluster: &str) -> Result<Vec<DiskRef>, ApiError> {
        let filter = format!("labels.{}=\"{}\"", CLUSTER_LABEL, cluster);
        let resp: DiskListResponse = self.http.get(&self.disks_url(), &[("filter", &filter)])?;
        Ok(resp.items.iter().map(disk_ref).collect())
    }

    fn delete_disk(&self, disk: &DiskRef) -> Result<OperationHandle, ApiError> {
        info!(disk = %disk.name, zone = %self.zone, "deleting disk");
        let url = format!("{}/{}", self.disks_url(), disk.name);
        let op: ComputeOperation = self.http.delete(&url)?;
        Ok(self.zone_handle(&op))
    }

    fn operation_status(&self, op: &OperationHandle) -> Result<OperationReport, ApiError> {
        let url = format!(
            "{}/projects/{}/{}/operations/{}",
            BASE, self.project, op.scope, op.id
        );
        let wire: ComputeOperation = self.http.get(&url, &[])?;
        Ok(report_from(&wire))
    }
}

fn disk_ref(disk: &Disk) -> DiskRef {
    DiskRef {
        name: disk.name.clone(),
        attached: !disk.users.is_empty(),
        size_gb: disk
            .size_gb
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}
