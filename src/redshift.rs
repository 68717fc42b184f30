use anyhow::Result;
use aws_sdk_redshift::types::Cluster;
use aws_sdk_redshift::Client;
use tracing::info;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedshiftClusterSummary {
    pub identifier: String,
    pub node_type: String,
    pub status: String,
    pub database: String,
}

/// Redshift cluster samples.
#[derive(Debug, Clone)]
pub struct Redshift {
    client: Client,
}

impl Redshift {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn describe_clusters(&self) -> Result<Vec<RedshiftClusterSummary>> {
        let clusters: Vec<_> = self
            .client
            .describe_clusters()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("DescribeClusters", e))?;

        Ok(clusters.iter().map(cluster_summary).collect())
    }

    pub async fn pause_cluster(&self, cluster_id: &str) -> Result<()> {
        self.client
            .pause_cluster()
            .cluster_identifier(cluster_id)
            .send()
            .await
            .map_err(|e| service_error("PauseCluster", e))?;
        info!("Pausing {cluster_id}");
        Ok(())
    }

    pub async fn resume_cluster(&self, cluster_id: &str) -> Result<()> {
        self.client
            .resume_cluster()
            .cluster_identifier(cluster_id)
            .send()
            .await
            .map_err(|e| service_error("ResumeCluster", e))?;
        info!("Resuming {cluster_id}");
        Ok(())
    }

    /// Deletes a cluster without taking a final snapshot.
    pub async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        self.client
            .delete_cluster()
            .cluster_identifier(cluster_id)
            .skip_final_cluster_snapshot(true)
            .send()
            .await
            .map_err(|e| service_error("DeleteCluster", e))?;
        info!("Deleting {cluster_id}");
        Ok(())
    }
}

fn cluster_summary(cluster: &Cluster) -> RedshiftClusterSummary {
    RedshiftClusterSummary {
        identifier: cluster.cluster_identifier().unwrap_or_default().to_string(),
        node_type: cluster.node_type().unwrap_or_default().to_string(),
        status: cluster.cluster_status().unwrap_or_default().to_string(),
        database: cluster.db_name().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_summary_reads_node_type_and_database() {
        let cluster = Cluster::builder()
            .cluster_identifier("analytics")
            .node_type("ra3.xlplus")
            .cluster_status("paused")
            .db_name("dev")
            .build();
        assert_eq!(
            cluster_summary(&cluster),
            RedshiftClusterSummary {
                identifier: "analytics".to_string(),
                node_type: "ra3.xlplus".to_string(),
                status: "paused".to_string(),
                database: "dev".to_string(),
            }
        );
    }
}
