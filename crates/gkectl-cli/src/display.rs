use serde::Serialize;
use tabled::Tabled;

use gkectl_core::cluster::ClusterSummary;

/// Display row for `gkectl list`.
#[derive(Debug, Serialize, Tabled)]
pub struct ClusterRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "ZONE")]
    pub zone: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "NODES")]
    pub nodes: i32,
    #[tabled(rename = "POOLS")]
    pub pools: String,
    #[tabled(rename = "CREATED")]
    pub created: String,
}

impl From<&ClusterSummary> for ClusterRow {
    fn from(summary: &ClusterSummary) -> Self {
        Self {
            name: summary.name.clone(),
            zone: summary.zone.clone(),
            status: summary.status.to_string(),
            nodes: summary.total_nodes(),
            pools: summary
                .pools
                .iter()
                .map(|p| format!("{}:{}", p.name, p.nodes))
                .collect::<Vec<_>>()
                .join(" "),
            created: summary
                .created
                .as_deref()
                .map(created_date)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Reduce the control plane's RFC 3339 timestamp to a date for the table.
fn created_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gkectl_core::cluster::{ClusterStatus, PoolNodes};

    #[test]
    fn test_row_from_summary() {
        let summary = ClusterSummary {
            name: "t1".to_string(),
            zone: "us-central1-b".to_string(),
            status: ClusterStatus::Running,
            endpoint: Some("34.1.2.3".to_string()),
            created: Some("2025-06-01T12:30:00+00:00".to_string()),
            pools: vec![
                PoolNodes {
                    name: "default-pool".to_string(),
                    nodes: 3,
                },
                PoolNodes {
                    name: "burst".to_string(),
                    nodes: 0,
                },
            ],
        };
        let row = ClusterRow::from(&summary);
        assert_eq!(row.status, "RUNNING");
        assert_eq!(row.nodes, 3);
        assert_eq!(row.pools, "default-pool:3 burst:0");
        assert_eq!(row.created, "2025-06-01");
    }

    #[test]
    fn test_row_without_creation_time() {
        let summary = ClusterSummary {
            name: "t1".to_string(),
            zone: "us-central1-b".to_string(),
            status: ClusterStatus::Provisioning,
            endpoint: None,
            created: None,
            pools: Vec::new(),
        };
        let row = ClusterRow::from(&summary);
        assert_eq!(row.created, "-");
        assert_eq!(row.pools, "");
    }
}
