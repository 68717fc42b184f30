use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::rds::{DbSnapshotSummary, Rds};

#[derive(Debug, Parser)]
pub struct RdsCommand {
    #[command(subcommand)]
    pub action: RdsAction,
}

#[derive(Debug, Subcommand)]
pub enum RdsAction {
    DescribeInstances,
    CreateSnapshot {
        instance_id: String,
        snapshot_id: String,
    },
    DescribeSnapshots {
        #[arg(long)]
        instance_id: Option<String>,
    },
    StopInstance { instance_id: String },
    StartInstance { instance_id: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: RdsCommand, yes: bool) -> Result<()> {
    let rds = Rds::new(sdk_config);
    match cmd.action {
        RdsAction::DescribeInstances => {
            for db in rds.describe_instances().await? {
                println!("{}  {}  {}  {}", db.identifier, db.engine, db.class, db.status);
            }
        }
        RdsAction::CreateSnapshot {
            instance_id,
            snapshot_id,
        } => print_snapshot(&rds.create_snapshot(&instance_id, &snapshot_id).await?),
        RdsAction::DescribeSnapshots { instance_id } => rds
            .describe_snapshots(instance_id.as_deref())
            .await?
            .iter()
            .for_each(print_snapshot),
        RdsAction::StopInstance { instance_id } => {
            if confirm(&format!("Stop instance {instance_id}"), yes)? {
                rds.stop_instance(&instance_id).await?;
            }
        }
        RdsAction::StartInstance { instance_id } => rds.start_instance(&instance_id).await?,
    }
    Ok(())
}

fn print_snapshot(snapshot: &DbSnapshotSummary) {
    println!(
        "{}  {}  {}",
        snapshot.identifier, snapshot.instance, snapshot.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_snapshot_takes_both_ids() {
        let cmd = RdsCommand::try_parse_from(["rds", "create-snapshot", "orders-db", "orders-db-nightly"])
            .unwrap();
        match cmd.action {
            RdsAction::CreateSnapshot {
                instance_id,
                snapshot_id,
            } => {
                assert_eq!(instance_id, "orders-db");
                assert_eq!(snapshot_id, "orders-db-nightly");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn snapshots_filter_by_instance() {
        let cmd = RdsCommand::try_parse_from(["rds", "describe-snapshots"]).unwrap();
        assert!(matches!(cmd.action, RdsAction::DescribeSnapshots { instance_id: None }));

        let cmd = RdsCommand::try_parse_from(["rds", "describe-snapshots", "--instance-id", "orders-db"])
            .unwrap();
        match cmd.action {
            RdsAction::DescribeSnapshots { instance_id } => {
                assert_eq!(instance_id.as_deref(), Some("orders-db"))
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn stop_instance_needs_an_id() {
        assert!(RdsCommand::try_parse_from(["rds", "stop-instance"]).is_err());
        let cmd = RdsCommand::try_parse_from(["rds", "stop-instance", "orders-db"]).unwrap();
        assert!(matches!(cmd.action, RdsAction::StopInstance { .. }));
    }
}
