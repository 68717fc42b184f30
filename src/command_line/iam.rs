use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::iam::{Iam, Principal};

#[derive(Debug, Parser)]
pub struct IamCommand {
    #[command(subcommand)]
    pub action: IamAction,
}

#[derive(Debug, Subcommand)]
pub enum IamAction {
    ListUsers,
    CreateUser { user_name: String },
    DeleteUser { user_name: String },
    ListRoles {
        /// Only roles under this path, e.g. /service-role/.
        #[arg(long)]
        path_prefix: Option<String>,
    },
    /// Create an access key; the secret is shown only once.
    CreateAccessKey { user_name: String },
    AccountAlias,
}

pub async fn run(sdk_config: &SdkConfig, cmd: IamCommand, yes: bool) -> Result<()> {
    let iam = Iam::new(sdk_config);
    match cmd.action {
        IamAction::ListUsers => iam.list_users().await?.iter().for_each(print_principal),
        IamAction::CreateUser { user_name } => print_principal(&iam.create_user(&user_name).await?),
        IamAction::DeleteUser { user_name } => {
            if confirm(&format!("Delete user {user_name}"), yes)? {
                iam.delete_user(&user_name).await?;
            }
        }
        IamAction::ListRoles { path_prefix } => iam
            .list_roles(path_prefix.as_deref())
            .await?
            .iter()
            .for_each(print_principal),
        IamAction::CreateAccessKey { user_name } => {
            let key = iam.create_access_key(&user_name).await?;
            println!("Access key id: {}", key.access_key_id);
            println!("Secret access key: {}", key.secret_access_key);
        }
        IamAction::AccountAlias => match iam.get_account_alias().await? {
            Some(alias) => println!("{alias}"),
            None => println!("The account has no alias"),
        },
    }
    Ok(())
}

fn print_principal(principal: &Principal) {
    println!("{}  {}", principal.name, principal.arn);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_filter_by_path_prefix() {
        let cmd = IamCommand::try_parse_from(["iam", "list-roles", "--path-prefix", "/service-role/"]).unwrap();
        match cmd.action {
            IamAction::ListRoles { path_prefix } => {
                assert_eq!(path_prefix.as_deref(), Some("/service-role/"))
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn user_actions_take_a_name() {
        let cmd = IamCommand::try_parse_from(["iam", "create-access-key", "alice"]).unwrap();
        match cmd.action {
            IamAction::CreateAccessKey { user_name } => assert_eq!(user_name, "alice"),
            other => panic!("unexpected action {other:?}"),
        }
        assert!(IamCommand::try_parse_from(["iam", "delete-user"]).is_err());
        assert!(matches!(
            IamCommand::try_parse_from(["iam", "account-alias"]).unwrap().action,
            IamAction::AccountAlias
        ));
    }
}
