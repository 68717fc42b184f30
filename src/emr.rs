use anyhow::{anyhow, Result};
use aws_sdk_emr::types::{ClusterState, ClusterStatus};
use aws_sdk_emr::Client;
use tracing::info;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    pub id: String,
    pub name: String,
    pub state: String,
}

/// EMR cluster samples.
#[derive(Debug, Clone)]
pub struct Emr {
    client: Client,
}

impl Emr {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Lists clusters that are starting, running, or waiting.
    pub async fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let clusters: Vec<_> = self
            .client
            .list_clusters()
            .set_cluster_states(Some(active_states()))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListClusters", e))?;

        Ok(clusters
            .iter()
            .map(|cluster| ClusterSummary {
                id: cluster.id().unwrap_or_default().to_string(),
                name: cluster.name().unwrap_or_default().to_string(),
                state: state_name(cluster.status()),
            })
            .collect())
    }

    pub async fn describe_cluster(&self, cluster_id: &str) -> Result<ClusterSummary> {
        let output = self
            .client
            .describe_cluster()
            .cluster_id(cluster_id)
            .send()
            .await
            .map_err(|e| service_error("DescribeCluster", e))?;
        let cluster = output
            .cluster()
            .ok_or_else(|| anyhow!("Cluster {cluster_id} not found"))?;
        Ok(ClusterSummary {
            id: cluster.id().unwrap_or(cluster_id).to_string(),
            name: cluster.name().unwrap_or_default().to_string(),
            state: state_name(cluster.status()),
        })
    }

    /// Terminates a cluster. Termination protection must be off.
    pub async fn terminate_cluster(&self, cluster_id: &str) -> Result<()> {
        self.client
            .terminate_job_flows()
            .job_flow_ids(cluster_id)
            .send()
            .await
            .map_err(|e| service_error("TerminateJobFlows", e))?;
        info!("Termination requested for cluster {cluster_id}");
        Ok(())
    }
}

fn active_states() -> Vec<ClusterState> {
    vec![
        ClusterState::Starting,
        ClusterState::Bootstrapping,
        ClusterState::Running,
        ClusterState::Waiting,
    ]
}

fn state_name(status: Option<&ClusterStatus>) -> String {
    status
        .and_then(|s| s.state())
        .map(|s| s.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_skips_finished_clusters() {
        let states = active_states();
        assert!(states.contains(&ClusterState::Running));
        assert!(states.contains(&ClusterState::Waiting));
        assert!(!states.contains(&ClusterState::Terminating));
        assert!(!states.contains(&ClusterState::Terminated));
        assert!(!states.contains(&ClusterState::TerminatedWithErrors));
    }

    #[test]
    fn state_name_reads_the_status() {
        let status = ClusterStatus::builder().state(ClusterState::Waiting).build();
        assert_eq!(state_name(Some(&status)), "WAITING");
        assert_eq!(state_name(None), "");
    }
}
