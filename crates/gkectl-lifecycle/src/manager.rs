use std::time::Duration;

use tracing::{info, warn};

use gkectl_core::cluster::{
    ClusterSpec, ClusterStatus, ClusterSummary, NetworkingSpec, expected_transition, validate_name,
    zone_region,
};
use gkectl_core::error::{ApiError, LifecycleError, TeardownStep};
use gkectl_core::operation::{OperationHandle, OperationReport, OperationStatus};
use gkectl_core::plane::{ControlPlane, DiskRef, NetworkPlane};
use gkectl_core::poll::{PollPolicy, PollStep, poll_until, retry_transient};

/// Backoff for re-reading operation status when the read itself hiccups.
const STATUS_RETRY_ATTEMPTS: u32 = 3;
const STATUS_RETRY_DELAY: Duration = Duration::from_millis(500);

/// The cluster lifecycle manager: a stateless client over the remote
/// control planes. Each operation submits one mutation at a time and blocks,
/// polling with a bounded policy, until the control plane reports a terminal
/// state. Killing the process stops the polling but not the remote mutation;
/// the control plane finishes it regardless.
pub struct LifecycleManager<C, N> {
    control: C,
    network: N,
    cluster_poll: PollPolicy,
    resize_poll: PollPolicy,
    network_poll: PollPolicy,
}

impl<C: ControlPlane, N: NetworkPlane> LifecycleManager<C, N> {
    pub fn new(control: C, network: N) -> Self {
        Self {
            control,
            network,
            cluster_poll: PollPolicy::cluster_op(),
            resize_poll: PollPolicy::resize_op(),
            network_poll: PollPolicy::network_op(),
        }
    }

    /// Override the polling cadence, e.g. millisecond policies in tests.
    pub fn with_poll_policies(
        mut self,
        cluster: PollPolicy,
        resize: PollPolicy,
        network: PollPolicy,
    ) -> Self {
        self.cluster_poll = cluster;
        self.resize_poll = resize;
        self.network_poll = network;
        self
    }

    /// Create the cluster described by `spec` and block until it is RUNNING.
    ///
    /// When private nodes are requested, the router and NAT gateway are
    /// provisioned first (pods need them for outbound connectivity), and the
    /// cluster is not reported ready until the NAT gateway is confirmed by a
    /// read-back. On failure the error names every resource already applied;
    /// nothing is rolled back or retried here, since re-submitting a
    /// partially applied mutation can duplicate billable resources.
    pub fn create(&self, spec: &ClusterSpec) -> Result<OperationHandle, LifecycleError> {
        validate_name(&spec.name, "Cluster")
            .map_err(|e| provisioning(e.to_string(), &[]))?;
        for pool in &spec.pools {
            validate_name(&pool.name, "Node pool")
                .map_err(|e| provisioning(e.to_string(), &[]))?;
            if pool.initial_node_count < 0 {
                return Err(provisioning(
                    format!(
                        "node pool '{}' requests {} nodes; count must be >= 0",
                        pool.name, pool.initial_node_count
                    ),
                    &[],
                ));
            }
        }

        let mut applied: Vec<String> = Vec::new();
        let net = spec
            .private_nodes
            .then(|| NetworkingSpec::for_cluster(&spec.name, &spec.region()));

        if let Some(net) = &net {
            info!(router = %net.router, nat = %net.nat, "provisioning networking for private nodes");
            let op = self
                .network
                .create_router_with_nat(net)
                .map_err(|e| provisioning(e.to_string(), &applied))?;
            wait_for(
                &self.network_poll,
                "router creation",
                || self.network.operation_status(&op),
                |msg| provisioning(msg, &applied),
            )?;
            applied.push(format!(
                "router '{}' with NAT gateway '{}'",
                net.router, net.nat
            ));
        }

        let op = self
            .control
            .create_cluster(spec)
            .map_err(|e| provisioning(e.to_string(), &applied))?;
        wait_for(
            &self.cluster_poll,
            "cluster creation",
            || self.control.operation_status(&op),
            |msg| provisioning(msg, &applied),
        )?;

        // The operation can complete slightly ahead of the status flip;
        // confirm the cluster itself reports a terminal status.
        let mut last_seen = ClusterStatus::Unknown;
        let summary = poll_until(&self.cluster_poll, "cluster readiness", || {
            let summary = retry_transient(
                STATUS_RETRY_ATTEMPTS,
                STATUS_RETRY_DELAY,
                "cluster status read",
                || self.control.get_cluster(&spec.name),
            )
            .map_err(|e| provisioning(e.to_string(), &applied))?;

            if !expected_transition(last_seen, summary.status) {
                warn!(from = %last_seen, to = %summary.status, "unexpected status transition observed");
            }
            last_seen = summary.status;

            if summary.status.is_terminal() {
                Ok(PollStep::Complete(summary))
            } else {
                Ok(PollStep::Pending(summary.status.to_string()))
            }
        })
        .map_err(LifecycleError::from)?;

        applied.push(format!("cluster '{}'", spec.name));
        if summary.status != ClusterStatus::Running {
            return Err(provisioning(
                format!("cluster ended in {} state", summary.status),
                &applied,
            ));
        }

        // A private cluster is not ready until its NAT gateway exists:
        // nodes without public addresses have no outbound path otherwise.
        if let Some(net) = &net {
            poll_until(&self.network_poll, "NAT gateway confirmation", || {
                match self.network.nat_gateway_count(net) {
                    Ok(n) if n >= 1 => Ok(PollStep::Complete(())),
                    Ok(_) => Ok(PollStep::Pending("NAT gateway not visible yet".to_string())),
                    Err(e) if e.is_transient() => Ok(PollStep::Pending(e.to_string())),
                    Err(e) => Err(provisioning(e.to_string(), &applied)),
                }
            })
            .map_err(LifecycleError::from)?;
        }

        info!(cluster = %spec.name, "cluster is RUNNING");
        Ok(op)
    }

    /// Resize node pools to `target` nodes: one named pool, or every pool
    /// when `pool` is None. Scaling a pool that is already at the target is
    /// a successful no-op and submits nothing.
    pub fn scale(
        &self,
        name: &str,
        pool: Option<&str>,
        target: i32,
    ) -> Result<(), LifecycleError> {
        if target < 0 {
            return Err(LifecycleError::Scaling {
                pool: pool.unwrap_or("all").to_string(),
                message: format!("target node count must be >= 0, got {}", target),
            });
        }

        let summary = self.describe(name)?;
        if summary.status != ClusterStatus::Running {
            return Err(LifecycleError::Scaling {
                pool: pool.unwrap_or("all").to_string(),
                message: format!(
                    "cluster '{}' is {}, not RUNNING",
                    name, summary.status
                ),
            });
        }

        let targets: Vec<_> = match pool {
            Some(p) => vec![
                summary
                    .pool(p)
                    .ok_or_else(|| LifecycleError::not_found("node pool", p))?,
            ],
            None => summary.pools.iter().collect(),
        };

        for p in targets {
            if p.nodes == target {
                info!(pool = %p.name, nodes = target, "pool already at target size");
                continue;
            }
            let op = self
                .control
                .resize_node_pool(name, &p.name, target)
                .map_err(|e| match e {
                    ApiError::NotFound(_) => LifecycleError::not_found("node pool", &p.name),
                    e => LifecycleError::Scaling {
                        pool: p.name.clone(),
                        message: e.to_string(),
                    },
                })?;
            wait_for(
                &self.resize_poll,
                &format!("resize of node pool '{}'", p.name),
                || self.control.operation_status(&op),
                |msg| LifecycleError::Scaling {
                    pool: p.name.clone(),
                    message: msg,
                },
            )?;
            info!(pool = %p.name, nodes = target, "pool resized");
        }

        Ok(())
    }

    /// All clusters visible in the configured project, as a finite,
    /// non-restartable sequence. Empty when none exist. This is the one
    /// call that retries transient transport failures internally, being
    /// side-effect-free.
    pub fn list(&self) -> Result<ClusterList, LifecycleError> {
        let clusters = retry_transient(
            STATUS_RETRY_ATTEMPTS,
            STATUS_RETRY_DELAY,
            "cluster listing",
            || self.control.list_clusters(),
        )?;
        Ok(ClusterList {
            inner: clusters.into_iter(),
        })
    }

    /// Current summary of one cluster, read through to the control plane.
    pub fn describe(&self, name: &str) -> Result<ClusterSummary, LifecycleError> {
        match self.control.get_cluster(name) {
            Ok(summary) => Ok(summary),
            Err(ApiError::NotFound(_)) => Err(LifecycleError::not_found("cluster", name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Tear the cluster down: orphanable PV disks first, then the cluster,
    /// then a sweep of disks the teardown released, then the router/NAT
    /// (which cannot be removed while the cluster still references them).
    /// Fails naming the step that broke so the caller can clean up manually.
    pub fn delete(&self, name: &str) -> Result<(), LifecycleError> {
        let summary = self.describe(name)?;
        let net = NetworkingSpec::for_cluster(name, &zone_region(&summary.zone));

        self.sweep_disks(name, "before cluster teardown")?;

        let op = self
            .control
            .delete_cluster(name)
            .map_err(|e| teardown(TeardownStep::Cluster, e.to_string()))?;
        wait_for(
            &self.cluster_poll,
            "cluster deletion",
            || self.control.operation_status(&op),
            |msg| teardown(TeardownStep::Cluster, msg),
        )?;
        info!(cluster = %name, "cluster deleted");

        self.sweep_disks(name, "released by cluster teardown")?;

        match self.network.delete_router(&net) {
            Ok(op) => {
                wait_for(
                    &self.network_poll,
                    "router deletion",
                    || self.network.operation_status(&op),
                    |msg| teardown(TeardownStep::Network, msg),
                )?;
                info!(router = %net.router, "router and NAT gateway deleted");
            }
            // Public clusters never had networking provisioned.
            Err(ApiError::NotFound(_)) => {}
            Err(e) => return Err(teardown(TeardownStep::Network, e.to_string())),
        }

        Ok(())
    }

    /// Delete every unattached disk labeled to the cluster. Attached disks
    /// are skipped: the instance holding them is the cluster's own node and
    /// goes away with it.
    fn sweep_disks(&self, cluster: &str, phase: &str) -> Result<(), LifecycleError> {
        let disks = self
            .network
            .list_cluster_disks(cluster)
            .map_err(|e| teardown(TeardownStep::Disk, e.to_string()))?;

        for disk in disks.iter().filter(|d| !d.attached) {
            info!(disk = %disk.name, size_gb = disk.size_gb, phase, "deleting disk");
            self.delete_disk(disk)?;
        }
        for disk in disks.iter().filter(|d| d.attached) {
            warn!(disk = %disk.name, phase, "disk still attached, leaving for cluster teardown");
        }
        Ok(())
    }

    fn delete_disk(&self, disk: &DiskRef) -> Result<(), LifecycleError> {
        let op = self
            .network
            .delete_disk(disk)
            .map_err(|e| teardown(TeardownStep::Disk, format!("disk '{}': {}", disk.name, e)))?;
        wait_for(
            &self.network_poll,
            &format!("deletion of disk '{}'", disk.name),
            || self.network.operation_status(&op),
            |msg| teardown(TeardownStep::Disk, format!("disk '{}': {}", disk.name, msg)),
        )
    }
}

/// Finite, non-restartable sequence of cluster summaries.
pub struct ClusterList {
    inner: std::vec::IntoIter<ClusterSummary>,
}

impl Iterator for ClusterList {
    type Item = ClusterSummary;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ClusterList {}

fn provisioning(mut message: String, applied: &[String]) -> LifecycleError {
    if !applied.is_empty() {
        message = format!(
            "{} (already created and left behind: {})",
            message,
            applied.join(", ")
        );
    }
    LifecycleError::Provisioning {
        message,
        partial: applied.to_vec(),
    }
}

fn teardown(step: TeardownStep, message: String) -> LifecycleError {
    LifecycleError::Teardown { step, message }
}

/// Poll one operation to its terminal state. A reported failure goes through
/// `fail` (caller remediates); exhausting the policy yields Timeout (caller
/// may simply wait again). The status read itself is retried on transient
/// errors since it is a pure read.
fn wait_for<FE, FF>(
    policy: &PollPolicy,
    what: &str,
    fetch: FE,
    mut fail: FF,
) -> Result<(), LifecycleError>
where
    FE: Fn() -> Result<OperationReport, ApiError>,
    FF: FnMut(String) -> LifecycleError,
{
    poll_until(policy, what, || {
        let report = retry_transient(STATUS_RETRY_ATTEMPTS, STATUS_RETRY_DELAY, what, &fetch)
            .map_err(|e| fail(e.to_string()))?;
        match report.status {
            OperationStatus::Done => match report.error {
                None => Ok(PollStep::Complete(())),
                Some(msg) => Err(fail(msg)),
            },
            OperationStatus::Aborting => Err(fail(
                report.error.unwrap_or_else(|| "operation aborted".to_string()),
            )),
            status => Ok(PollStep::Pending(status.to_string())),
        }
    })
    .map_err(LifecycleError::from)
}
