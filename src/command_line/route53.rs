use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::route53::Route53;

#[derive(Debug, Parser)]
pub struct Route53Command {
    #[command(subcommand)]
    pub action: Route53Action,
}

/// Zone ids may be given with or without the `/hostedzone/` prefix.
#[derive(Debug, Subcommand)]
pub enum Route53Action {
    ListHostedZones,
    CreateHostedZone { domain: String },
    ListRecords { zone_id: String },
    /// Create or replace a record set.
    Upsert {
        zone_id: String,
        name: String,
        /// Record type, e.g. A, CNAME, TXT.
        #[arg(long = "type", default_value = "A")]
        record_type: String,
        #[arg(long, default_value_t = 300)]
        ttl: i64,
        #[arg(required = true)]
        values: Vec<String>,
    },
    DeleteHostedZone { zone_id: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: Route53Command, yes: bool) -> Result<()> {
    let route53 = Route53::new(sdk_config);
    match cmd.action {
        Route53Action::ListHostedZones => {
            for zone in route53.list_hosted_zones().await? {
                println!("{}  {}  ({} records)", zone.id, zone.name, zone.record_count);
            }
        }
        Route53Action::CreateHostedZone { domain } => {
            let id = route53.create_hosted_zone(&domain).await?;
            println!("Created hosted zone {id}");
        }
        Route53Action::ListRecords { zone_id } => {
            for record in route53.list_record_sets(&zone_id).await? {
                let ttl = record.ttl.map(|t| t.to_string()).unwrap_or_default();
                println!(
                    "{} {} {} {}",
                    record.name,
                    record.record_type,
                    ttl,
                    record.values.join(",")
                );
            }
        }
        Route53Action::Upsert {
            zone_id,
            name,
            record_type,
            ttl,
            values,
        } => {
            let change = route53
                .upsert_record(&zone_id, &name, &record_type, ttl, &values)
                .await?;
            println!("Change {change} submitted");
        }
        Route53Action::DeleteHostedZone { zone_id } => {
            if confirm(&format!("Delete hosted zone {zone_id}"), yes)? {
                route53.delete_hosted_zone(&zone_id).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_takes_several_values() {
        let cmd = Route53Command::try_parse_from([
            "route53",
            "upsert",
            "Z123",
            "www.example.com",
            "--ttl",
            "60",
            "192.0.2.1",
            "192.0.2.2",
        ])
        .unwrap();
        match cmd.action {
            Route53Action::Upsert {
                record_type,
                ttl,
                values,
                ..
            } => {
                assert_eq!(record_type, "A");
                assert_eq!(ttl, 60);
                assert_eq!(values, vec!["192.0.2.1", "192.0.2.2"]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn upsert_needs_a_value() {
        assert!(
            Route53Command::try_parse_from(["route53", "upsert", "Z123", "www.example.com"])
                .is_err()
        );
    }
}
