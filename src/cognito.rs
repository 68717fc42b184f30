use anyhow::Result;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, UserType};
use aws_sdk_cognitoidentityprovider::Client;

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPoolSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolUser {
    pub username: String,
    pub status: String,
    pub enabled: bool,
    pub attributes: Vec<(String, String)>,
}

/// Cognito user pool samples.
#[derive(Debug, Clone)]
pub struct Cognito {
    client: Client,
}

impl Cognito {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn list_user_pools(&self) -> Result<Vec<UserPoolSummary>> {
        let pools: Vec<_> = self
            .client
            .list_user_pools()
            .max_results(60)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListUserPools", e))?;
        Ok(pools
            .iter()
            .map(|pool| UserPoolSummary {
                id: pool.id().unwrap_or_default().to_string(),
                name: pool.name().unwrap_or_default().to_string(),
            })
            .collect())
    }

    pub async fn list_users(&self, user_pool_id: &str) -> Result<Vec<PoolUser>> {
        let users: Vec<_> = self
            .client
            .list_users()
            .user_pool_id(user_pool_id)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListUsers", e))?;
        Ok(users.iter().map(pool_user).collect())
    }

    pub async fn admin_get_user(&self, user_pool_id: &str, username: &str) -> Result<PoolUser> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| service_error("AdminGetUser", e))?;
        Ok(PoolUser {
            username: output.username().to_string(),
            status: output
                .user_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            enabled: output.enabled(),
            attributes: attribute_pairs(output.user_attributes()),
        })
    }
}

fn pool_user(user: &UserType) -> PoolUser {
    PoolUser {
        username: user.username().unwrap_or_default().to_string(),
        status: user
            .user_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        enabled: user.enabled(),
        attributes: attribute_pairs(user.attributes()),
    }
}

fn attribute_pairs(attributes: &[AttributeType]) -> Vec<(String, String)> {
    attributes
        .iter()
        .map(|a| (a.name().to_string(), a.value().unwrap_or_default().to_string()))
        .collect()
}
