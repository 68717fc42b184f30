use anyhow::{anyhow, Result};
use aws_sdk_sns::types::Topic;
use aws_sdk_sns::Client;
use tracing::info;

use crate::error::service_error;

/// SNS topic samples.
#[derive(Debug, Clone)]
pub struct Sns {
    client: Client,
}

impl Sns {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Creates a topic (idempotent for an existing name) and returns its ARN.
    pub async fn create_topic(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| service_error("CreateTopic", e))?;
        let arn = output
            .topic_arn()
            .ok_or_else(|| anyhow!("CreateTopic returned no topic ARN"))?
            .to_string();
        info!("Topic ARN: {arn}");
        Ok(arn)
    }

    pub async fn list_topics(&self) -> Result<Vec<String>> {
        let topics: Vec<_> = self
            .client
            .list_topics()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListTopics", e))?;
        Ok(topic_arns(topics))
    }

    /// Subscribes an endpoint (email address, SQS queue ARN, HTTPS URL, ...).
    ///
    /// Email subscriptions stay "pending confirmation" until the recipient confirms.
    pub async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str) -> Result<String> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .return_subscription_arn(true)
            .send()
            .await
            .map_err(|e| service_error("Subscribe", e))?;
        Ok(output.subscription_arn().unwrap_or_default().to_string())
    }

    pub async fn publish(&self, topic_arn: &str, message: &str, subject: Option<&str>) -> Result<String> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .set_subject(subject.map(str::to_string))
            .send()
            .await
            .map_err(|e| service_error("Publish", e))?;
        let id = output.message_id().unwrap_or_default().to_string();
        info!("Published message {id}");
        Ok(id)
    }

    pub async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        self.client
            .delete_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(|e| service_error("DeleteTopic", e))?;
        info!("Deleted topic {topic_arn}");
        Ok(())
    }
}

fn topic_arns(topics: Vec<Topic>) -> Vec<String> {
    topics.into_iter().filter_map(|topic| topic.topic_arn).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_without_arn_are_skipped() {
        let topics = vec![
            Topic::builder().topic_arn("arn:aws:sns:us-east-1:123456789012:orders").build(),
            Topic::builder().build(),
        ];
        assert_eq!(topic_arns(topics), vec!["arn:aws:sns:us-east-1:123456789012:orders"]);
    }
}
