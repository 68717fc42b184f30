use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::emr::{ClusterSummary, Emr};

#[derive(Debug, Parser)]
pub struct EmrCommand {
    #[command(subcommand)]
    pub action: EmrAction,
}

#[derive(Debug, Subcommand)]
pub enum EmrAction {
    /// List clusters that are starting, running or waiting.
    ListClusters,
    DescribeCluster { cluster_id: String },
    TerminateCluster { cluster_id: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: EmrCommand, yes: bool) -> Result<()> {
    let emr = Emr::new(sdk_config);
    match cmd.action {
        EmrAction::ListClusters => {
            let clusters = emr.list_clusters().await?;
            clusters.iter().for_each(print_cluster);
            println!("Found {} active clusters", clusters.len());
        }
        EmrAction::DescribeCluster { cluster_id } => {
            print_cluster(&emr.describe_cluster(&cluster_id).await?)
        }
        EmrAction::TerminateCluster { cluster_id } => {
            if confirm(&format!("Terminate cluster {cluster_id}"), yes)? {
                emr.terminate_cluster(&cluster_id).await?;
                println!("Termination requested for {cluster_id}");
            }
        }
    }
    Ok(())
}

fn print_cluster(cluster: &ClusterSummary) {
    println!("{}  {}  {}", cluster.id, cluster.state, cluster.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_takes_a_cluster_id() {
        let cmd = EmrCommand::try_parse_from(["emr", "terminate-cluster", "j-2AXXXXXXGAPLF"]).unwrap();
        match cmd.action {
            EmrAction::TerminateCluster { cluster_id } => assert_eq!(cluster_id, "j-2AXXXXXXGAPLF"),
            other => panic!("unexpected action {other:?}"),
        }
        assert!(EmrCommand::try_parse_from(["emr", "terminate-cluster"]).is_err());
    }

    #[test]
    fn list_clusters_has_no_arguments() {
        let cmd = EmrCommand::try_parse_from(["emr", "list-clusters"]).unwrap();
        assert!(matches!(cmd.action, EmrAction::ListClusters));
        assert!(EmrCommand::try_parse_from(["emr", "list-clusters", "extra"]).is_err());
    }
}
