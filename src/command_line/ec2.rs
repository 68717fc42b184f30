use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::prompt::confirm;
use crate::ec2::Ec2;

#[derive(Debug, Parser)]
pub struct Ec2Command {
    #[command(subcommand)]
    pub action: Ec2Action,
}

#[derive(Debug, Subcommand)]
pub enum Ec2Action {
    DescribeInstances,
    DescribeRegions,
    StartInstance { instance_id: String },
    StopInstance { instance_id: String },
    /// Create a key pair and save the private key.
    CreateKeyPair {
        key_name: String,
        /// Defaults to `<key_name>.pem` in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    DeleteKeyPair { key_name: String },
    SecurityGroups,
}

pub async fn run(sdk_config: &SdkConfig, cmd: Ec2Command, yes: bool) -> Result<()> {
    let ec2 = Ec2::new(sdk_config);
    match cmd.action {
        Ec2Action::DescribeInstances => {
            for instance in ec2.describe_instances().await? {
                println!(
                    "{}  {}  {}  {}",
                    instance.id,
                    instance.instance_type,
                    instance.state,
                    instance.public_ip.as_deref().unwrap_or("-")
                );
            }
        }
        Ec2Action::DescribeRegions => ec2
            .describe_regions()
            .await?
            .iter()
            .for_each(|region| println!("{region}")),
        Ec2Action::StartInstance { instance_id } => ec2.start_instance(&instance_id).await?,
        Ec2Action::StopInstance { instance_id } => {
            if confirm(&format!("Stop instance {instance_id}"), yes)? {
                ec2.stop_instance(&instance_id).await?;
            }
        }
        Ec2Action::CreateKeyPair { key_name, output } => {
            let path = output.unwrap_or_else(|| key_file(&key_name));
            let key_pair_id = ec2.create_key_pair(&key_name, &path).await?;
            println!("Saved {key_name} to {} ({key_pair_id})", path.display());
        }
        Ec2Action::DeleteKeyPair { key_name } => {
            if confirm(&format!("Delete key pair {key_name}"), yes)? {
                ec2.delete_key_pair(&key_name).await?;
            }
        }
        Ec2Action::SecurityGroups => {
            for group in ec2.describe_security_groups().await? {
                println!("{}  {}  {}", group.id, group.name, group.description);
            }
        }
    }
    Ok(())
}

fn key_file(key_name: &str) -> PathBuf {
    PathBuf::from(format!("{key_name}.pem"))
}
