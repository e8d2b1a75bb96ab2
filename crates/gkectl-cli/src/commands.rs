use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gkectl_core::cluster::ClusterSpec;
use gkectl_core::error::LifecycleError;
use gkectl_core::settings::{self, Settings};
use gkectl_gcp::{ComputeClient, ContainerClient, auth};
use gkectl_lifecycle::LifecycleManager;

use crate::display::ClusterRow;
use crate::logging;
use crate::output::{self, OutputFormat};
use crate::ui;

#[derive(Parser)]
#[command(
    name = "gkectl",
    version,
    about = "Cost-optimized GKE cluster lifecycle manager"
)]
struct Cli {
    /// Output format: table, json, yaml
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a cluster (spot nodes, zero initial nodes, small disks)
    Create {
        /// Cluster name
        #[arg(long, default_value = settings::DEFAULT_CLUSTER_NAME)]
        name: String,
        /// Use regular on-demand instances instead of spot
        #[arg(long)]
        no_spot: bool,
        /// Private nodes behind a Cloud Router + NAT gateway
        #[arg(long)]
        private: bool,
        /// Node machine type
        #[arg(long, default_value = settings::DEFAULT_MACHINE_TYPE)]
        machine_type: String,
        /// Node boot disk size in GB
        #[arg(long, default_value_t = settings::DEFAULT_DISK_SIZE_GB)]
        disk_size: i32,
    },
    /// Scale node pools to a target node count
    Scale {
        /// Cluster name
        #[arg(long, default_value = settings::DEFAULT_CLUSTER_NAME)]
        name: String,
        /// Target number of nodes (0 stops all compute cost)
        #[arg(long)]
        nodes: u32,
        /// Only scale this pool (default: every pool)
        #[arg(long)]
        pool: Option<String>,
    },
    /// List clusters in the configured project and zone
    List,
    /// Delete a cluster, its disks, and its networking
    Delete {
        /// Cluster name
        #[arg(long, default_value = settings::DEFAULT_CLUSTER_NAME)]
        name: String,
    },
}

type GcpManager = LifecycleManager<ContainerClient, ComputeClient>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();
    let out_fmt = OutputFormat::from_str_arg(&cli.output);

    let creds = auth::discover()?;
    let zone = settings::zone();
    let cfg = Settings::new(&creds.project, &zone);
    // Keep `list -o json|yaml` machine-readable: no banner there.
    if !matches!(cli.command, Commands::List) {
        ui::info(&format!("Project: {}   Zone: {}", cfg.project, cfg.zone));
    }

    let control = ContainerClient::new(&creds.token, &cfg.project, &cfg.zone)?;
    let network = ComputeClient::new(&creds.token, &cfg.project, &cfg.zone)?;
    let manager = LifecycleManager::new(control, network);

    match cli.command {
        Commands::Create {
            name,
            no_spot,
            private,
            machine_type,
            disk_size,
        } => cmd_create(
            &manager,
            &cfg,
            &name,
            !no_spot,
            private,
            &machine_type,
            disk_size,
        ),
        Commands::Scale { name, nodes, pool } => {
            let nodes = i32::try_from(nodes).context("node count too large")?;
            cmd_scale(&manager, &name, pool.as_deref(), nodes)
        }
        Commands::List => cmd_list(&manager, out_fmt),
        Commands::Delete { name } => cmd_delete(&manager, &name),
    }
}

fn cmd_create(
    manager: &GcpManager,
    cfg: &Settings,
    name: &str,
    spot: bool,
    private: bool,
    machine_type: &str,
    disk_size: i32,
) -> Result<()> {
    let mut spec = ClusterSpec::cost_optimized(name, &cfg.project, &cfg.zone, spot);
    spec.private_nodes = private;
    for pool in &mut spec.pools {
        pool.machine_type = machine_type.to_string();
        pool.disk_size_gb = disk_size;
    }

    ui::info(&format!("Creating cluster '{}'...", name));
    ui::info(&format!(
        "Machine type: {}   Disk: {}GB {}   Spot: {}",
        machine_type,
        disk_size,
        spec.pools[0].disk_type,
        if spot { "enabled" } else { "disabled" }
    ));
    if private {
        ui::info("Private nodes requested: a router and NAT gateway will be provisioned first");
    }

    let pb = ui::spinner("Waiting for cluster creation (typically 3-5 minutes)...");
    let result = manager.create(&spec);
    pb.finish_and_clear();

    if let Err(err) = result {
        if let LifecycleError::Provisioning { partial, .. } = &err {
            for resource in partial {
                ui::warn(&format!("left behind: {}", resource));
            }
        }
        return Err(err.into());
    }

    let summary = manager.describe(name)?;
    ui::success(&format!("Cluster '{}' created", name));
    if let Some(endpoint) = &summary.endpoint {
        ui::info(&format!("Endpoint: {}", endpoint));
    }
    ui::info(&format!(
        "Status: {}   Nodes: {}",
        summary.status,
        summary.total_nodes()
    ));
    ui::info("Cost allocation and workload identity are on; managed Prometheus is off");

    println!();
    ui::hint_box(
        "Connect",
        &[&format!(
            "gcloud container clusters get-credentials {} --zone {} --project {}",
            name, cfg.zone, cfg.project
        )],
    );
    ui::info(&format!(
        "Scale up:   gkectl scale --name {} --nodes 3",
        name
    ));
    ui::info(&format!(
        "Scale down: gkectl scale --name {} --nodes 0   (stops all compute cost)",
        name
    ));

    Ok(())
}

fn cmd_scale(manager: &GcpManager, name: &str, pool: Option<&str>, nodes: i32) -> Result<()> {
    let summary = manager.describe(name)?;

    ui::info(&format!("Scaling cluster '{}' to {} nodes...", name, nodes));
    for p in &summary.pools {
        if pool.is_none() || pool == Some(p.name.as_str()) {
            ui::info(&format!("  {}: {} -> {} nodes", p.name, p.nodes, nodes));
        }
    }
    if nodes == 0 {
        ui::info("Scaling to 0 keeps the cluster configuration but stops all compute cost");
    }

    let pb = ui::spinner("Waiting for scaling to complete...");
    let result = manager.scale(name, pool, nodes);
    pb.finish_and_clear();
    result?;

    ui::success(&format!("Cluster '{}' scaled to {} nodes", name, nodes));
    if nodes == 0 {
        ui::info(&format!(
            "Scale back up with: gkectl scale --name {} --nodes 3",
            name
        ));
    }
    Ok(())
}

fn cmd_list(manager: &GcpManager, format: OutputFormat) -> Result<()> {
    let rows: Vec<ClusterRow> = manager.list()?.map(|s| ClusterRow::from(&s)).collect();
    output::render_list(&rows, format, "No clusters found.");
    Ok(())
}

fn cmd_delete(manager: &GcpManager, name: &str) -> Result<()> {
    ui::info(&format!(
        "Deleting cluster '{}' (disks, then cluster, then networking)...",
        name
    ));

    let pb = ui::spinner("Waiting for teardown to complete...");
    let result = manager.delete(name);
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            ui::success(&format!(
                "Cluster '{}', its disks, and its networking are deleted",
                name
            ));
            Ok(())
        }
        Err(err) => {
            if let LifecycleError::Teardown { step, .. } = &err {
                ui::error(&format!(
                    "teardown stopped at the {} step; later steps were not attempted",
                    step
                ));
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_defaults() {
        let cli = Cli::parse_from(["gkectl", "create"]);
        match cli.command {
            Commands::Create {
                name,
                no_spot,
                private,
                machine_type,
                disk_size,
            } => {
                assert_eq!(name, "cost-optimized-cluster");
                assert!(!no_spot);
                assert!(!private);
                assert_eq!(machine_type, "e2-standard-2");
                assert_eq!(disk_size, 20);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_scale_requires_nodes() {
        assert!(Cli::try_parse_from(["gkectl", "scale"]).is_err());
        let cli = Cli::parse_from(["gkectl", "scale", "--nodes", "3", "--pool", "default-pool"]);
        match cli.command {
            Commands::Scale { name, nodes, pool } => {
                assert_eq!(name, "cost-optimized-cluster");
                assert_eq!(nodes, 3);
                assert_eq!(pool.as_deref(), Some("default-pool"));
            }
            _ => panic!("expected scale"),
        }
    }

    #[test]
    fn test_scale_rejects_negative_nodes() {
        assert!(Cli::try_parse_from(["gkectl", "scale", "--nodes", "-1"]).is_err());
    }

    #[test]
    fn test_output_flag_is_global() {
        let cli = Cli::parse_from(["gkectl", "list", "-o", "json"]);
        assert_eq!(cli.output, "json");
    }
}
