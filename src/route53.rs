use anyhow::{anyhow, Result};
use aws_sdk_route53::operation::list_resource_record_sets::ListResourceRecordSetsOutput;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client;
use chrono::Utc;
use tracing::info;

use crate::error::service_error;

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneSummary {
    pub id: String,
    pub name: String,
    pub record_count: i64,
}

/// Where the next page of a record listing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordStart {
    name: String,
    record_type: Option<RrType>,
    identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub name: String,
    pub record_type: String,
    pub ttl: Option<i64>,
    pub values: Vec<String>,
}

/// Route 53 hosted zone and record samples.
#[derive(Debug, Clone)]
pub struct Route53 {
    client: Client,
}

impl Route53 {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn list_hosted_zones(&self) -> Result<Vec<HostedZoneSummary>> {
        let zones: Vec<_> = self
            .client
            .list_hosted_zones()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListHostedZones", e))?;

        Ok(zones
            .iter()
            .map(|zone| HostedZoneSummary {
                id: normalize_zone_id(zone.id()).to_string(),
                name: zone.name().to_string(),
                record_count: zone.resource_record_set_count().unwrap_or_default(),
            })
            .collect())
    }

    /// Creates a public hosted zone; returns its id.
    pub async fn create_hosted_zone(&self, domain: &str) -> Result<String> {
        let output = self
            .client
            .create_hosted_zone()
            .name(domain)
            .caller_reference(caller_reference(domain))
            .send()
            .await
            .map_err(|e| service_error("CreateHostedZone", e))?;
        let id = output
            .hosted_zone()
            .map(|zone| normalize_zone_id(zone.id()).to_string())
            .ok_or_else(|| anyhow!("CreateHostedZone returned no hosted zone"))?;
        info!("Created hosted zone {id} for {domain}");
        Ok(id)
    }

    /// Every record in the zone. ListResourceRecordSets pages by record name and
    /// type rather than by token, so the next page starts where the last one ended.
    pub async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<RecordSummary>> {
        let mut records = Vec::new();
        let mut start: Option<RecordStart> = None;
        loop {
            let output = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(normalize_zone_id(zone_id))
                .set_start_record_name(start.as_ref().map(|s| s.name.clone()))
                .set_start_record_type(start.as_ref().and_then(|s| s.record_type.clone()))
                .set_start_record_identifier(start.as_ref().and_then(|s| s.identifier.clone()))
                .send()
                .await
                .map_err(|e| service_error("ListResourceRecordSets", e))?;

            records.extend(output.resource_record_sets().iter().map(record_summary));
            match next_start(&output) {
                Some(next) => start = Some(next),
                None => return Ok(records),
            }
        }
    }

    /// Creates or replaces a single record; returns the change id.
    pub async fn upsert_record(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
        ttl: i64,
        values: &[String],
    ) -> Result<String> {
        let batch = upsert_batch(name, record_type, ttl, values)?;
        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(normalize_zone_id(zone_id))
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| service_error("ChangeResourceRecordSets", e))?;
        let change_id = output
            .change_info()
            .map(|info| info.id().to_string())
            .unwrap_or_default();
        info!("Submitted change {change_id}");
        Ok(change_id)
    }

    /// Deletes a hosted zone. Only the SOA and NS records may remain.
    pub async fn delete_hosted_zone(&self, zone_id: &str) -> Result<()> {
        self.client
            .delete_hosted_zone()
            .id(normalize_zone_id(zone_id))
            .send()
            .await
            .map_err(|e| service_error("DeleteHostedZone", e))?;
        info!("Deleted hosted zone {zone_id}");
        Ok(())
    }
}

/// Accepts both `Z123` and `/hostedzone/Z123`.
pub fn normalize_zone_id(zone_id: &str) -> &str {
    zone_id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(zone_id)
}

/// Caller references must be unique per request; the timestamp makes retries of
/// the same command distinct.
pub fn caller_reference(domain: &str) -> String {
    format!("{domain}-{}", Utc::now().timestamp_millis())
}

fn next_start(output: &ListResourceRecordSetsOutput) -> Option<RecordStart> {
    if !output.is_truncated() {
        return None;
    }
    Some(RecordStart {
        name: output.next_record_name()?.to_string(),
        record_type: output.next_record_type().cloned(),
        identifier: output.next_record_identifier().map(str::to_string),
    })
}

fn record_summary(set: &ResourceRecordSet) -> RecordSummary {
    RecordSummary {
        name: set.name().to_string(),
        record_type: set.r#type().as_str().to_string(),
        ttl: set.ttl(),
        values: set
            .resource_records()
            .iter()
            .map(|record| record.value().to_string())
            .collect(),
    }
}

fn upsert_batch(name: &str, record_type: &str, ttl: i64, values: &[String]) -> Result<ChangeBatch> {
    if values.is_empty() {
        return Err(anyhow!("A record needs at least one value"));
    }
    let records = values
        .iter()
        .map(|value| ResourceRecord::builder().value(value).build())
        .collect::<Result<Vec<_>, _>>()?;
    let record_set = ResourceRecordSet::builder()
        .name(name)
        .r#type(RrType::from(record_type.to_ascii_uppercase().as_str()))
        .ttl(ttl)
        .set_resource_records(Some(records))
        .build()?;
    Ok(ChangeBatch::builder()
        .changes(
            Change::builder()
                .action(ChangeAction::Upsert)
                .resource_record_set(record_set)
                .build()?,
        )
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_route53::operation::list_resource_record_sets::builders::ListResourceRecordSetsOutputBuilder;

    #[test]
    fn zone_ids_are_normalized() {
        assert_eq!(normalize_zone_id("/hostedzone/Z0123ABC"), "Z0123ABC");
        assert_eq!(normalize_zone_id("Z0123ABC"), "Z0123ABC");
    }

    #[test]
    fn caller_reference_names_the_domain() {
        assert!(caller_reference("example.com").starts_with("example.com-"));
    }

    fn page(truncated: bool) -> ListResourceRecordSetsOutputBuilder {
        ListResourceRecordSetsOutput::builder()
            .set_resource_record_sets(Some(Vec::new()))
            .is_truncated(truncated)
            .max_items(300)
    }

    #[test]
    fn truncated_page_continues_at_next_record() {
        let output = page(true)
            .next_record_name("mail.example.com.")
            .next_record_type(RrType::Mx)
            .build()
            .unwrap();
        assert_eq!(
            next_start(&output),
            Some(RecordStart {
                name: "mail.example.com.".to_string(),
                record_type: Some(RrType::Mx),
                identifier: None,
            })
        );

        let weighted = page(true)
            .next_record_name("api.example.com.")
            .next_record_type(RrType::A)
            .next_record_identifier("blue")
            .build()
            .unwrap();
        assert_eq!(next_start(&weighted).and_then(|s| s.identifier).as_deref(), Some("blue"));
    }

    #[test]
    fn last_page_stops_listing() {
        let output = page(false).next_record_name("ignored.example.com.").build().unwrap();
        assert_eq!(next_start(&output), None);
    }

    #[test]
    fn record_summary_lists_values() {
        let batch = upsert_batch(
            "www.example.com",
            "A",
            60,
            &["192.0.2.1".to_string(), "192.0.2.2".to_string()],
        )
        .unwrap();
        let summary = record_summary(batch.changes()[0].resource_record_set().unwrap());
        assert_eq!(summary.name, "www.example.com");
        assert_eq!(summary.record_type, "A");
        assert_eq!(summary.ttl, Some(60));
        assert_eq!(summary.values, vec!["192.0.2.1", "192.0.2.2"]);
    }

    #[test]
    fn upsert_batch_holds_one_change() {
        let batch = upsert_batch("www.example.com", "a", 300, &["192.0.2.1".to_string()]).unwrap();
        let change = &batch.changes()[0];
        assert_eq!(change.action(), &ChangeAction::Upsert);
        let set = change.resource_record_set().unwrap();
        assert_eq!(set.r#type(), &RrType::A);
        assert_eq!(set.ttl(), Some(300));
        assert!(upsert_batch("www.example.com", "A", 300, &[]).is_err());
    }
}
