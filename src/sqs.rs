use anyhow::{anyhow, Result};
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;
use std::collections::HashMap;
use tracing::info;

use crate::error::service_error;

/// Long polling waits at most this many seconds per ReceiveMessage call.
pub const MAX_WAIT_SECONDS: i32 = 20;
/// ReceiveMessage returns at most this many messages.
pub const MAX_MESSAGES: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub attributes: HashMap<String, String>,
}

/// SQS queue and message samples.
#[derive(Debug, Clone)]
pub struct Sqs {
    client: Client,
}

impl Sqs {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Creates a queue and returns its URL.
    pub async fn create_queue(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| service_error("CreateQueue", e))?;
        let url = output
            .queue_url()
            .ok_or_else(|| anyhow!("CreateQueue returned no queue URL"))?
            .to_string();
        info!("Created queue {url}");
        Ok(url)
    }

    pub async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        self.client
            .list_queues()
            .set_queue_name_prefix(prefix.map(str::to_string))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListQueues", e))
    }

    pub async fn get_queue_url(&self, name: &str) -> Result<String> {
        let output = match self.client.get_queue_url().queue_name(name).send().await {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_queue_does_not_exist()) => {
                return Err(anyhow!("Queue '{name}' does not exist"));
            }
            Err(e) => return Err(service_error("GetQueueUrl", e)),
        };
        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("GetQueueUrl returned no queue URL"))
    }

    /// Sends a message with optional string attributes; returns the message id.
    pub async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: &[(String, String)],
    ) -> Result<String> {
        let mut request = self.client.send_message().queue_url(queue_url).message_body(body);
        for (name, value) in attributes {
            request = request.message_attributes(name, string_attribute(value)?);
        }
        let output = request
            .send()
            .await
            .map_err(|e| service_error("SendMessage", e))?;
        let id = output.message_id().unwrap_or_default().to_string();
        info!("Sent message {id}");
        Ok(id)
    }

    /// Receives up to `max` messages, long polling for `wait_seconds`.
    pub async fn receive_messages(
        &self,
        queue_url: &str,
        max: i32,
        wait_seconds: i32,
    ) -> Result<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max.clamp(1, MAX_MESSAGES))
            .wait_time_seconds(wait_seconds.clamp(0, MAX_WAIT_SECONDS))
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| service_error("ReceiveMessage", e))?;

        Ok(output
            .messages()
            .iter()
            .map(|message| QueueMessage {
                message_id: message.message_id().unwrap_or_default().to_string(),
                receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
                body: message.body().unwrap_or_default().to_string(),
                attributes: message
                    .message_attributes()
                    .map(|attributes| {
                        attributes
                            .iter()
                            .filter_map(|(name, value)| {
                                value
                                    .string_value()
                                    .map(|v| (name.clone(), v.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    pub async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| service_error("DeleteMessage", e))?;
        info!("Deleted message from {queue_url}");
        Ok(())
    }

    pub async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        self.client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| service_error("DeleteQueue", e))?;
        info!("Deleted queue {queue_url}");
        Ok(())
    }
}

fn string_attribute(value: &str) -> Result<MessageAttributeValue> {
    Ok(MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build()?)
}

/// Parses `name=value` pairs given on the command line.
pub fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_string_typed() {
        let attribute = string_attribute("blue").unwrap();
        assert_eq!(attribute.data_type(), "String");
        assert_eq!(attribute.string_value(), Some("blue"));
    }

    #[test]
    fn attribute_pairs_parse() {
        assert_eq!(
            parse_attribute("color=blue=ish"),
            Ok(("color".to_string(), "blue=ish".to_string()))
        );
        assert!(parse_attribute("=blue").is_err());
        assert!(parse_attribute("color").is_err());
    }
}
