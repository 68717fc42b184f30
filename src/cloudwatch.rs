use anyhow::{bail, Result};
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{MetricAlarm, MetricDatum, StandardUnit, Statistic};
use aws_sdk_cloudwatch::Client;
use std::time::{Duration, SystemTime};
use tracing::info;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSummary {
    pub namespace: String,
    pub name: String,
    pub dimensions: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSummary {
    pub name: String,
    pub state: String,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub timestamp: String,
    pub average: Option<f64>,
    pub maximum: Option<f64>,
}

/// CloudWatch metrics and alarms samples.
#[derive(Debug, Clone)]
pub struct CloudWatch {
    client: Client,
}

impl CloudWatch {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn list_metrics(&self, namespace: Option<&str>) -> Result<Vec<MetricSummary>> {
        let metrics: Vec<_> = self
            .client
            .list_metrics()
            .set_namespace(namespace.map(str::to_string))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListMetrics", e))?;

        Ok(metrics
            .iter()
            .map(|metric| MetricSummary {
                namespace: metric.namespace().unwrap_or_default().to_string(),
                name: metric.metric_name().unwrap_or_default().to_string(),
                dimensions: metric
                    .dimensions()
                    .iter()
                    .map(|d| {
                        (
                            d.name().unwrap_or_default().to_string(),
                            d.value().unwrap_or_default().to_string(),
                        )
                    })
                    .collect(),
            })
            .collect())
    }

    /// Publishes one data point for a custom metric.
    pub async fn put_metric(
        &self,
        namespace: &str,
        metric_name: &str,
        value: f64,
        unit: &str,
    ) -> Result<()> {
        self.client
            .put_metric_data()
            .namespace(namespace)
            .metric_data(metric_datum(metric_name, value, unit))
            .send()
            .await
            .map_err(|e| service_error("PutMetricData", e))?;
        info!("Put {metric_name}={value} {unit} into {namespace}");
        Ok(())
    }

    pub async fn describe_alarms(&self, prefix: Option<&str>) -> Result<Vec<AlarmSummary>> {
        let mut pages = self
            .client
            .describe_alarms()
            .set_alarm_name_prefix(prefix.map(str::to_string))
            .into_paginator()
            .send();

        let mut alarms = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("DescribeAlarms", e))?;
            alarms.extend(page.metric_alarms().iter().map(alarm_summary));
        }
        Ok(alarms)
    }

    /// Average and maximum of a metric over the trailing `window`, one point per `period`.
    pub async fn get_metric_statistics(
        &self,
        namespace: &str,
        metric_name: &str,
        window: Duration,
        period: Duration,
    ) -> Result<Vec<Datapoint>> {
        let period = period_seconds(period)?;
        let end = SystemTime::now();
        let start = end - window;
        let output = self
            .client
            .get_metric_statistics()
            .namespace(namespace)
            .metric_name(metric_name)
            .start_time(DateTime::from(start))
            .end_time(DateTime::from(end))
            .period(period)
            .statistics(Statistic::Average)
            .statistics(Statistic::Maximum)
            .send()
            .await
            .map_err(|e| service_error("GetMetricStatistics", e))?;

        let mut points: Vec<_> = output
            .datapoints()
            .iter()
            .map(|point| {
                (
                    point.timestamp().map(|t| t.as_secs_f64()).unwrap_or_default(),
                    Datapoint {
                        timestamp: point
                            .timestamp()
                            .and_then(|t| t.fmt(aws_smithy_types::date_time::Format::DateTime).ok())
                            .unwrap_or_default(),
                        average: point.average(),
                        maximum: point.maximum(),
                    },
                )
            })
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(points.into_iter().map(|(_, point)| point).collect())
    }
}

fn alarm_summary(alarm: &MetricAlarm) -> AlarmSummary {
    AlarmSummary {
        name: alarm.alarm_name().unwrap_or_default().to_string(),
        state: alarm
            .state_value()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        metric: alarm.metric_name().unwrap_or_default().to_string(),
    }
}

/// Statistics periods for standard-resolution metrics are whole minutes.
fn period_seconds(period: Duration) -> Result<i32> {
    let secs = period.as_secs();
    if secs < 60 || secs % 60 != 0 {
        bail!("Period must be a positive multiple of 60 seconds, got {secs}");
    }
    Ok(i32::try_from(secs)?)
}

fn metric_datum(metric_name: &str, value: f64, unit: &str) -> MetricDatum {
    MetricDatum::builder()
        .metric_name(metric_name)
        .value(value)
        .unit(StandardUnit::from(unit))
        .timestamp(DateTime::from(SystemTime::now()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_cloudwatch::types::StateValue;

    #[test]
    fn alarm_summary_reads_state_and_metric() {
        let alarm = MetricAlarm::builder()
            .alarm_name("HighCpu")
            .state_value(StateValue::Alarm)
            .metric_name("CPUUtilization")
            .build();
        assert_eq!(
            alarm_summary(&alarm),
            AlarmSummary {
                name: "HighCpu".to_string(),
                state: "ALARM".to_string(),
                metric: "CPUUtilization".to_string(),
            }
        );
    }

    #[test]
    fn periods_are_whole_minutes() {
        assert_eq!(period_seconds(Duration::from_secs(60)).unwrap(), 60);
        assert_eq!(period_seconds(Duration::from_secs(3600)).unwrap(), 3600);
        assert!(period_seconds(Duration::from_secs(0)).is_err());
        assert!(period_seconds(Duration::from_secs(59)).is_err());
        assert!(period_seconds(Duration::from_secs(90)).is_err());
        assert!(period_seconds(Duration::from_secs(u64::MAX - u64::MAX % 60)).is_err());
    }

    #[test]
    fn datum_carries_unit_and_value() {
        let datum = metric_datum("PagesVisited", 3.0, "Count");
        assert_eq!(datum.metric_name(), Some("PagesVisited"));
        assert_eq!(datum.value(), Some(3.0));
        assert_eq!(datum.unit(), Some(&StandardUnit::Count));
        assert!(datum.timestamp().is_some());
    }
}
