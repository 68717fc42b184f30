use anyhow::Result;
use aws_sdk_rds::types::{DbInstance, DbSnapshot};
use aws_sdk_rds::Client;
use tracing::info;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInstanceSummary {
    pub identifier: String,
    pub engine: String,
    pub class: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSnapshotSummary {
    pub identifier: String,
    pub instance: String,
    pub status: String,
}

/// RDS instance and snapshot samples.
#[derive(Debug, Clone)]
pub struct Rds {
    client: Client,
}

impl Rds {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn describe_instances(&self) -> Result<Vec<DbInstanceSummary>> {
        let instances: Vec<_> = self
            .client
            .describe_db_instances()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("DescribeDBInstances", e))?;

        Ok(instances.iter().map(instance_summary).collect())
    }

    pub async fn create_snapshot(&self, instance_id: &str, snapshot_id: &str) -> Result<DbSnapshotSummary> {
        let output = self
            .client
            .create_db_snapshot()
            .db_instance_identifier(instance_id)
            .db_snapshot_identifier(snapshot_id)
            .send()
            .await
            .map_err(|e| service_error("CreateDBSnapshot", e))?;
        let status = output
            .db_snapshot()
            .and_then(|s| s.status())
            .unwrap_or("unknown")
            .to_string();
        info!("Snapshot {snapshot_id} of {instance_id} is {status}");
        Ok(DbSnapshotSummary {
            identifier: snapshot_id.to_string(),
            instance: instance_id.to_string(),
            status,
        })
    }

    pub async fn describe_snapshots(&self, instance_id: Option<&str>) -> Result<Vec<DbSnapshotSummary>> {
        let snapshots: Vec<_> = self
            .client
            .describe_db_snapshots()
            .set_db_instance_identifier(instance_id.map(str::to_string))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("DescribeDBSnapshots", e))?;

        Ok(snapshots.iter().map(snapshot_summary).collect())
    }

    pub async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        self.client
            .stop_db_instance()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|e| service_error("StopDBInstance", e))?;
        info!("Stopping {instance_id}");
        Ok(())
    }

    pub async fn start_instance(&self, instance_id: &str) -> Result<()> {
        self.client
            .start_db_instance()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|e| service_error("StartDBInstance", e))?;
        info!("Starting {instance_id}");
        Ok(())
    }
}

fn instance_summary(db: &DbInstance) -> DbInstanceSummary {
    DbInstanceSummary {
        identifier: db.db_instance_identifier().unwrap_or_default().to_string(),
        engine: db.engine().unwrap_or_default().to_string(),
        class: db.db_instance_class().unwrap_or_default().to_string(),
        status: db.db_instance_status().unwrap_or_default().to_string(),
    }
}

fn snapshot_summary(snapshot: &DbSnapshot) -> DbSnapshotSummary {
    DbSnapshotSummary {
        identifier: snapshot.db_snapshot_identifier().unwrap_or_default().to_string(),
        instance: snapshot.db_instance_identifier().unwrap_or_default().to_string(),
        status: snapshot.status().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_summary_reads_engine_and_class() {
        let db = DbInstance::builder()
            .db_instance_identifier("orders-db")
            .engine("postgres")
            .db_instance_class("db.t3.micro")
            .db_instance_status("available")
            .build();
        assert_eq!(
            instance_summary(&db),
            DbInstanceSummary {
                identifier: "orders-db".to_string(),
                engine: "postgres".to_string(),
                class: "db.t3.micro".to_string(),
                status: "available".to_string(),
            }
        );
    }

    #[test]
    fn snapshot_summary_names_its_instance() {
        let snapshot = DbSnapshot::builder()
            .db_snapshot_identifier("orders-db-nightly")
            .db_instance_identifier("orders-db")
            .status("creating")
            .build();
        let summary = snapshot_summary(&snapshot);
        assert_eq!(summary.identifier, "orders-db-nightly");
        assert_eq!(summary.instance, "orders-db");
        assert_eq!(summary.status, "creating");

        assert_eq!(snapshot_summary(&DbSnapshot::builder().build()).status, "");
    }
}
