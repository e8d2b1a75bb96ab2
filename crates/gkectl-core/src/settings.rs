use crate::cluster::zone_region;

/// Cost-optimized compiled defaults. Kept deliberately small: a 2 vCPU / 8GB
/// machine, the cheapest disk class, and zero initial nodes.
pub const DEFAULT_CLUSTER_NAME: &str = "cost-optimized-cluster";
pub const DEFAULT_ZONE: &str = "us-central1-b";
pub const DEFAULT_MACHINE_TYPE: &str = "e2-standard-2";
pub const DEFAULT_DISK_SIZE_GB: i32 = 20;
pub const DEFAULT_DISK_TYPE: &str = "pd-standard";
pub const DEFAULT_IMAGE_TYPE: &str = "COS_CONTAINERD";
pub const DEFAULT_POOL_NAME: &str = "default-pool";

/// The effective zone. Priority: runtime env `GKECTL_ZONE` > compiled default.
pub fn zone() -> String {
    std::env::var("GKECTL_ZONE").unwrap_or_else(|_| DEFAULT_ZONE.to_string())
}

/// Resolved per-invocation settings. Project comes from credential
/// discovery, zone from `zone()`; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project: String,
    pub zone: String,
}

impl Settings {
    pub fn new(project: &str, zone: &str) -> Self {
        Self {
            project: project.to_string(),
            zone: zone.to_string(),
        }
    }

    pub fn region(&self) -> String {
        zone_region(&self.zone)
    }
}
