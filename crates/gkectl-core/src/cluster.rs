use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::settings;

/// Cluster status as observed through the control plane. The manager never
/// owns this state — it only polls it until terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterStatus {
    Unknown,
    Provisioning,
    Running,
    Reconciling,
    Stopping,
    Error,
}

impl ClusterStatus {
    /// Map a control-plane status string. Anything unrecognized is Unknown.
    pub fn parse(s: &str) -> Self {
        match s {
            "PROVISIONING" => Self::Provisioning,
            "RUNNING" => Self::Running,
            "RECONCILING" => Self::Reconciling,
            "STOPPING" => Self::Stopping,
            "ERROR" | "DEGRADED" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// A terminal status for a create: the cluster either serves or failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Running | Self::Error)
    }
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Provisioning => write!(f, "PROVISIONING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Reconciling => write!(f, "RECONCILING"),
            Self::Stopping => write!(f, "STOPPING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Whether an observed pair of consecutive statuses matches the control
/// plane's documented state machine. Used only to flag surprising jumps in
/// logs; the manager keeps polling either way.
pub fn expected_transition(from: ClusterStatus, to: ClusterStatus) -> bool {
    use ClusterStatus::*;
    if from == to || to == Error {
        return true;
    }
    matches!(
        (from, to),
        (Unknown, Provisioning)
            | (Unknown, Running)
            | (Provisioning, Running)
            | (Running, Reconciling)
            | (Reconciling, Running)
            | (Running, Stopping)
            | (Reconciling, Stopping)
    )
}

/// Validate a cluster or node-pool name: lowercase alphanumeric + hyphens,
/// starting with a letter, at most 40 characters.
pub fn validate_name(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() || name.len() > 40 {
        bail!("{} name must be 1-40 characters, got {}", kind, name.len());
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        bail!("{} name must start with a lowercase letter: {:?}", kind, name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "{} name must be lowercase alphanumeric + hyphens: {:?}",
            kind,
            name
        );
    }
    if name.ends_with('-') {
        bail!("{} name must not end with a hyphen: {:?}", kind, name);
    }
    Ok(())
}

/// Derive the region from a zone, e.g. "us-central1-b" -> "us-central1".
pub fn zone_region(zone: &str) -> String {
    zone.rsplit_once('-')
        .map_or_else(|| zone.to_string(), |(region, _)| region.to_string())
}

/// A node taint applied at pool creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    /// NO_SCHEDULE, PREFER_NO_SCHEDULE, or NO_EXECUTE.
    pub effect: String,
}

/// Autoscaling bounds for a node pool. Absent means fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAutoscaling {
    pub min_nodes: i32,
    pub max_nodes: i32,
}

/// Desired shape of one node pool. Owned by exactly one ClusterSpec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolSpec {
    pub name: String,
    pub machine_type: String,
    pub disk_size_gb: i32,
    pub disk_type: String,
    pub image_type: String,
    pub initial_node_count: i32,
    pub autoscaling: Option<PoolAutoscaling>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub taints: Vec<Taint>,
}

impl Default for NodePoolSpec {
    fn default() -> Self {
        Self {
            name: settings::DEFAULT_POOL_NAME.to_string(),
            machine_type: settings::DEFAULT_MACHINE_TYPE.to_string(),
            disk_size_gb: settings::DEFAULT_DISK_SIZE_GB,
            disk_type: settings::DEFAULT_DISK_TYPE.to_string(),
            image_type: settings::DEFAULT_IMAGE_TYPE.to_string(),
            initial_node_count: 0,
            autoscaling: None,
            labels: BTreeMap::new(),
            taints: Vec::new(),
        }
    }
}

/// Desired state of a cluster. Built from CLI arguments, immutable once
/// submitted; the control plane is the source of truth afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub zone: String,
    /// Release channel (e.g. "REGULAR"). None keeps the control-plane default.
    pub release_channel: Option<String>,
    /// Nodes get no public addresses; requires a router + NAT gateway.
    pub private_nodes: bool,
    pub spot: bool,
    pub pools: Vec<NodePoolSpec>,
    /// Workload identity pool, "<project>.svc.id.goog".
    pub workload_pool: Option<String>,
    /// Cost allocation tracking.
    pub cost_allocation: bool,
    /// Managed Service for Prometheus. Off by default to reduce cost.
    pub managed_prometheus: bool,
}

impl ClusterSpec {
    /// The cost-optimized shape: one zero-node spot pool, small standard
    /// disk, managed Prometheus off, cost allocation and workload identity on.
    pub fn cost_optimized(name: &str, project: &str, zone: &str, spot: bool) -> Self {
        Self {
            name: name.to_string(),
            zone: zone.to_string(),
            release_channel: None,
            private_nodes: false,
            spot,
            pools: vec![NodePoolSpec::default()],
            workload_pool: Some(format!("{}.svc.id.goog", project)),
            cost_allocation: true,
            managed_prometheus: false,
        }
    }

    pub fn region(&self) -> String {
        zone_region(&self.zone)
    }
}

/// Router and NAT gateway names tied to one cluster. Created alongside the
/// cluster when private nodes are requested, deleted alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkingSpec {
    pub router: String,
    pub nat: String,
    pub region: String,
}

impl NetworkingSpec {
    pub fn for_cluster(cluster: &str, region: &str) -> Self {
        Self {
            router: format!("{}-router", cluster),
            nat: format!("{}-nat", cluster),
            region: region.to_string(),
        }
    }
}

/// Node count of one pool inside a ClusterSummary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolNodes {
    pub name: String,
    pub nodes: i32,
}

/// Read-only view of one cluster, derived entirely from the control plane's
/// current state. Never cached across invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub name: String,
    pub zone: String,
    pub status: ClusterStatus,
    pub endpoint: Option<String>,
    /// RFC 3339 creation timestamp as reported by the control plane.
    pub created: Option<String>,
    pub pools: Vec<PoolNodes>,
}

impl ClusterSummary {
    pub fn total_nodes(&self) -> i32 {
        self.pools.iter().map(|p| p.nodes).sum()
    }

    pub fn pool(&self, name: &str) -> Option<&PoolNodes> {
        self.pools.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(ClusterStatus::parse("RUNNING"), ClusterStatus::Running);
        assert_eq!(
            ClusterStatus::parse("PROVISIONING"),
            ClusterStatus::Provisioning
        );
        assert_eq!(ClusterStatus::parse("DEGRADED"), ClusterStatus::Error);
        assert_eq!(
            ClusterStatus::parse("STATUS_UNSPECIFIED"),
            ClusterStatus::Unknown
        );
        assert_eq!(ClusterStatus::parse(""), ClusterStatus::Unknown);
    }

    #[test]
    fn test_status_display_roundtrip() {
        for s in [
            ClusterStatus::Provisioning,
            ClusterStatus::Running,
            ClusterStatus::Reconciling,
            ClusterStatus::Stopping,
            ClusterStatus::Error,
        ] {
            assert_eq!(ClusterStatus::parse(&s.to_string()), s);
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(ClusterStatus::Running.is_terminal());
        assert!(ClusterStatus::Error.is_terminal());
        assert!(!ClusterStatus::Provisioning.is_terminal());
        assert!(!ClusterStatus::Reconciling.is_terminal());
        assert!(!ClusterStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_expected_transitions() {
        use ClusterStatus::*;
        assert!(expected_transition(Unknown, Provisioning));
        assert!(expected_transition(Provisioning, Running));
        assert!(expected_transition(Running, Reconciling));
        assert!(expected_transition(Reconciling, Running));
        assert!(expected_transition(Running, Stopping));
        assert!(expected_transition(Provisioning, Error));
        assert!(expected_transition(Stopping, Error));
        assert!(expected_transition(Running, Running));
    }

    #[test]
    fn test_unexpected_transitions() {
        use ClusterStatus::*;
        assert!(!expected_transition(Stopping, Running));
        assert!(!expected_transition(Provisioning, Reconciling));
        assert!(!expected_transition(Running, Provisioning));
    }

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("cost-optimized-cluster", "Cluster").is_ok());
        assert!(validate_name("t1", "Cluster").is_ok());
        assert!(validate_name("a", "Pool").is_ok());
    }

    #[test]
    fn test_validate_name_invalid() {
        assert!(validate_name("", "Cluster").is_err());
        assert!(validate_name("Upper", "Cluster").is_err());
        assert!(validate_name("1starts-with-digit", "Cluster").is_err());
        assert!(validate_name("trailing-", "Cluster").is_err());
        assert!(validate_name("has space", "Cluster").is_err());
        assert!(validate_name(&"a".repeat(41), "Cluster").is_err());
    }

    #[test]
    fn test_zone_region() {
        assert_eq!(zone_region("us-central1-b"), "us-central1");
        assert_eq!(zone_region("europe-west4-a"), "europe-west4");
        assert_eq!(zone_region("nozone"), "nozone");
    }

    #[test]
    fn test_cost_optimized_spec() {
        let spec = ClusterSpec::cost_optimized("t1", "my-proj", "us-central1-b", true);
        assert_eq!(spec.pools.len(), 1);
        assert_eq!(spec.pools[0].name, "default-pool");
        assert_eq!(spec.pools[0].initial_node_count, 0);
        assert_eq!(spec.pools[0].disk_size_gb, 20);
        assert!(spec.spot);
        assert!(!spec.managed_prometheus);
        assert!(spec.cost_allocation);
        assert_eq!(spec.workload_pool.as_deref(), Some("my-proj.svc.id.goog"));
        assert_eq!(spec.region(), "us-central1");
    }

    #[test]
    fn test_networking_names() {
        let net = NetworkingSpec::for_cluster("t1", "us-central1");
        assert_eq!(net.router, "t1-router");
        assert_eq!(net.nat, "t1-nat");
        assert_eq!(net.region, "us-central1");
    }

    #[test]
    fn test_summary_totals() {
        let summary = ClusterSummary {
            name: "t1".to_string(),
            zone: "us-central1-b".to_string(),
            status: ClusterStatus::Running,
            endpoint: None,
            created: None,
            pools: vec![
                PoolNodes {
                    name: "default-pool".to_string(),
                    nodes: 3,
                },
                PoolNodes {
                    name: "burst".to_string(),
                    nodes: 2,
                },
            ],
        };
        assert_eq!(summary.total_nodes(), 5);
        assert_eq!(summary.pool("burst").map(|p| p.nodes), Some(2));
        assert!(summary.pool("missing").is_none());
    }

    #[test]
    fn test_spec_json_roundtrip() {
        let spec = ClusterSpec::cost_optimized("t1", "my-proj", "us-central1-b", false);
        let json = serde_json::to_string_pretty(&spec).unwrap();
        let parsed: ClusterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
