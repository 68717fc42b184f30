use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use crate::cognito::{Cognito, PoolUser};

#[derive(Debug, Parser)]
pub struct CognitoCommand {
    #[command(subcommand)]
    pub action: CognitoAction,
}

#[derive(Debug, Subcommand)]
pub enum CognitoAction {
    ListUserPools,
    ListUsers { user_pool_id: String },
    /// Show one user with all of their attributes.
    GetUser {
        user_pool_id: String,
        username: String,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: CognitoCommand) -> Result<()> {
    let cognito = Cognito::new(sdk_config);
    match cmd.action {
        CognitoAction::ListUserPools => {
            for pool in cognito.list_user_pools().await? {
                println!("{}  {}", pool.id, pool.name);
            }
        }
        CognitoAction::ListUsers { user_pool_id } => {
            for user in cognito.list_users(&user_pool_id).await? {
                println!("{}  {}  enabled={}", user.username, user.status, user.enabled);
            }
        }
        CognitoAction::GetUser {
            user_pool_id,
            username,
        } => print_user(&cognito.admin_get_user(&user_pool_id, &username).await?),
    }
    Ok(())
}

fn print_user(user: &PoolUser) {
    println!("Username: {}", user.username);
    println!("Status: {}", user.status);
    println!("Enabled: {}", user.enabled);
    for (name, value) in &user.attributes {
        println!("  {name} = {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_user_takes_pool_and_username() {
        let cmd = CognitoCommand::try_parse_from(["cognito", "get-user", "us-east-1_EXAMPLE", "alice"]).unwrap();
        match cmd.action {
            CognitoAction::GetUser {
                user_pool_id,
                username,
            } => {
                assert_eq!(user_pool_id, "us-east-1_EXAMPLE");
                assert_eq!(username, "alice");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn list_users_needs_a_pool() {
        assert!(CognitoCommand::try_parse_from(["cognito", "list-users"]).is_err());
        assert!(matches!(
            CognitoCommand::try_parse_from(["cognito", "list-user-pools"]).unwrap().action,
            CognitoAction::ListUserPools
        ));
    }
}
