use anyhow::{anyhow, Result};
use aws_sdk_iam::types::{Role, User};
use aws_sdk_iam::Client;
use tracing::info;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub arn: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            name: user.user_name().to_string(),
            arn: user.arn().to_string(),
        }
    }
}

impl From<&Role> for Principal {
    fn from(role: &Role) -> Self {
        Self {
            name: role.role_name().to_string(),
            arn: role.arn().to_string(),
        }
    }
}

/// Newly created access key. The secret is only returned once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// IAM user and role samples.
#[derive(Debug, Clone)]
pub struct Iam {
    client: Client,
}

impl Iam {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<Principal>> {
        let users: Vec<_> = self
            .client
            .list_users()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListUsers", e))?;
        Ok(users.iter().map(Principal::from).collect())
    }

    pub async fn create_user(&self, user_name: &str) -> Result<Principal> {
        let output = match self.client.create_user().user_name(user_name).send().await {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_entity_already_exists_exception()) => {
                return Err(anyhow!("User {user_name} already exists"));
            }
            Err(e) => return Err(service_error("CreateUser", e)),
        };
        let user = output
            .user()
            .ok_or_else(|| anyhow!("CreateUser returned no user"))?;
        info!("Created user {}", user.arn());
        Ok(Principal::from(user))
    }

    /// Deletes a user. Access keys, policies and group memberships must be removed first.
    pub async fn delete_user(&self, user_name: &str) -> Result<()> {
        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| service_error("DeleteUser", e))?;
        info!("Deleted user {user_name}");
        Ok(())
    }

    pub async fn list_roles(&self, path_prefix: Option<&str>) -> Result<Vec<Principal>> {
        let roles: Vec<_> = self
            .client
            .list_roles()
            .set_path_prefix(path_prefix.map(str::to_string))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListRoles", e))?;
        Ok(roles.iter().map(Principal::from).collect())
    }

    pub async fn create_access_key(&self, user_name: &str) -> Result<AccessKey> {
        let output = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| service_error("CreateAccessKey", e))?;
        let key = output
            .access_key()
            .ok_or_else(|| anyhow!("CreateAccessKey returned no key"))?;
        Ok(AccessKey {
            access_key_id: key.access_key_id().to_string(),
            secret_access_key: key.secret_access_key().to_string(),
        })
    }

    /// The account alias, if one is set.
    pub async fn get_account_alias(&self) -> Result<Option<String>> {
        let output = self
            .client
            .list_account_aliases()
            .send()
            .await
            .map_err(|e| service_error("ListAccountAliases", e))?;
        Ok(first_alias(output.account_aliases()))
    }
}

/// An account has at most one alias.
fn first_alias(aliases: &[String]) -> Option<String> {
    aliases.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_iam::primitives::DateTime;

    #[test]
    fn users_and_roles_become_principals() {
        let user = User::builder()
            .path("/")
            .user_name("alice")
            .user_id("AIDAEXAMPLE")
            .arn("arn:aws:iam::123456789012:user/alice")
            .create_date(DateTime::from_secs(0))
            .build()
            .unwrap();
        assert_eq!(
            Principal::from(&user),
            Principal {
                name: "alice".to_string(),
                arn: "arn:aws:iam::123456789012:user/alice".to_string(),
            }
        );

        let role = Role::builder()
            .path("/service-role/")
            .role_name("lambda-exec")
            .role_id("AROAEXAMPLE")
            .arn("arn:aws:iam::123456789012:role/service-role/lambda-exec")
            .create_date(DateTime::from_secs(0))
            .build()
            .unwrap();
        assert_eq!(Principal::from(&role).name, "lambda-exec");
    }

    #[test]
    fn alias_is_optional() {
        assert_eq!(first_alias(&[]), None);
        assert_eq!(first_alias(&["my-team".to_string()]).as_deref(), Some("my-team"));
    }
}
