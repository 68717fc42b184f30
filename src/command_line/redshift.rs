use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::redshift::Redshift;

#[derive(Debug, Parser)]
pub struct RedshiftCommand {
    #[command(subcommand)]
    pub action: RedshiftAction,
}

#[derive(Debug, Subcommand)]
pub enum RedshiftAction {
    DescribeClusters,
    Pause { cluster_id: String },
    Resume { cluster_id: String },
    /// Delete a cluster without a final snapshot.
    Delete { cluster_id: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: RedshiftCommand, yes: bool) -> Result<()> {
    let redshift = Redshift::new(sdk_config);
    match cmd.action {
        RedshiftAction::DescribeClusters => {
            for cluster in redshift.describe_clusters().await? {
                println!(
                    "{}  {}  {}  {}",
                    cluster.identifier, cluster.node_type, cluster.status, cluster.database
                );
            }
        }
        RedshiftAction::Pause { cluster_id } => redshift.pause_cluster(&cluster_id).await?,
        RedshiftAction::Resume { cluster_id } => redshift.resume_cluster(&cluster_id).await?,
        RedshiftAction::Delete { cluster_id } => {
            if confirm(
                &format!("Delete cluster {cluster_id} without a final snapshot"),
                yes,
            )? {
                redshift.delete_cluster(&cluster_id).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_actions_take_a_cluster_id() {
        for (action, expected) in [("pause", "pause"), ("resume", "resume"), ("delete", "delete")] {
            let cmd = RedshiftCommand::try_parse_from(["redshift", action, "analytics"]).unwrap();
            let (name, cluster_id) = match cmd.action {
                RedshiftAction::Pause { cluster_id } => ("pause", cluster_id),
                RedshiftAction::Resume { cluster_id } => ("resume", cluster_id),
                RedshiftAction::Delete { cluster_id } => ("delete", cluster_id),
                other => panic!("unexpected action {other:?}"),
            };
            assert_eq!(name, expected);
            assert_eq!(cluster_id, "analytics");
        }
    }

    #[test]
    fn delete_needs_a_cluster_id() {
        assert!(RedshiftCommand::try_parse_from(["redshift", "delete"]).is_err());
    }
}
