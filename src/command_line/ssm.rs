use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::ssm::Ssm;

#[derive(Debug, Parser)]
pub struct SsmCommand {
    #[command(subcommand)]
    pub action: SsmAction,
}

#[derive(Debug, Subcommand)]
pub enum SsmAction {
    /// Print a parameter's value, decrypting SecureString values.
    Get { name: String },
    /// Create or overwrite a parameter.
    Put {
        name: String,
        value: String,
        /// Store as SecureString.
        #[arg(long)]
        secure: bool,
    },
    List,
    Delete { name: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: SsmCommand, yes: bool) -> Result<()> {
    let ssm = Ssm::new(sdk_config);
    match cmd.action {
        SsmAction::Get { name } => println!("{}", ssm.get_parameter(&name).await?),
        SsmAction::Put {
            name,
            value,
            secure,
        } => {
            let version = ssm.put_parameter(&name, &value, secure).await?;
            println!("{name} is now at version {version}");
        }
        SsmAction::List => {
            for (name, kind) in ssm.describe_parameters().await? {
                println!("{name}  {kind}");
            }
        }
        SsmAction::Delete { name } => {
            if confirm(&format!("Delete parameter {name}"), yes)? {
                ssm.delete_parameter(&name).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_is_plain_by_default() {
        let cmd = SsmCommand::try_parse_from(["ssm", "put", "/app/db", "secret"]).unwrap();
        assert!(matches!(cmd.action, SsmAction::Put { secure: false, .. }));

        let cmd =
            SsmCommand::try_parse_from(["ssm", "put", "/app/db", "secret", "--secure"]).unwrap();
        assert!(matches!(cmd.action, SsmAction::Put { secure: true, .. }));
    }
}
