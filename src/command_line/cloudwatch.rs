use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::cloudwatch::CloudWatch;

#[derive(Debug, Parser)]
pub struct CloudWatchCommand {
    #[command(subcommand)]
    pub action: CloudWatchAction,
}

#[derive(Debug, Subcommand)]
pub enum CloudWatchAction {
    /// List metrics, optionally in one namespace such as AWS/EC2.
    ListMetrics {
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Publish one data point to a custom metric.
    PutMetric {
        namespace: String,
        name: String,
        value: f64,
        /// Standard unit name, e.g. Count, Seconds, Percent.
        #[arg(long, default_value = "Count")]
        unit: String,
    },
    DescribeAlarms {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Average and maximum over the last few hours.
    Statistics {
        namespace: String,
        name: String,
        #[arg(long, default_value_t = 3)]
        hours: u64,
        /// Seconds per data point; a multiple of 60.
        #[arg(long, default_value_t = 300)]
        period: u64,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: CloudWatchCommand) -> Result<()> {
    let cloudwatch = CloudWatch::new(sdk_config);
    match cmd.action {
        CloudWatchAction::ListMetrics { namespace } => {
            let metrics = cloudwatch.list_metrics(namespace.as_deref()).await?;
            for metric in &metrics {
                let dimensions: Vec<String> = metric
                    .dimensions
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                println!(
                    "{}  {}  [{}]",
                    metric.namespace,
                    metric.name,
                    dimensions.join(", ")
                );
            }
            println!("Found {} metrics", metrics.len());
        }
        CloudWatchAction::PutMetric {
            namespace,
            name,
            value,
            unit,
        } => cloudwatch.put_metric(&namespace, &name, value, &unit).await?,
        CloudWatchAction::DescribeAlarms { prefix } => {
            for alarm in cloudwatch.describe_alarms(prefix.as_deref()).await? {
                println!("{}  {}  {}", alarm.name, alarm.state, alarm.metric);
            }
        }
        CloudWatchAction::Statistics {
            namespace,
            name,
            hours,
            period,
        } => {
            let points = cloudwatch
                .get_metric_statistics(
                    &namespace,
                    &name,
                    Duration::from_secs(hours * 3600),
                    Duration::from_secs(period),
                )
                .await?;
            for point in &points {
                println!(
                    "{}  avg={}  max={}",
                    point.timestamp,
                    point.average.map(|v| v.to_string()).unwrap_or_default(),
                    point.maximum.map(|v| v.to_string()).unwrap_or_default()
                );
            }
            println!("{} data points", points.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_metric_defaults_to_count() {
        let cmd = CloudWatchCommand::try_parse_from([
            "cloudwatch",
            "put-metric",
            "Samples",
            "Pages",
            "3.5",
        ])
        .unwrap();
        match cmd.action {
            CloudWatchAction::PutMetric { unit, value, .. } => {
                assert_eq!(unit, "Count");
                assert_eq!(value, 3.5);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
