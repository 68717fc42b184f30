use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::sqs::{parse_attribute, Sqs, MAX_WAIT_SECONDS};

#[derive(Debug, Parser)]
pub struct SqsCommand {
    #[command(subcommand)]
    pub action: SqsAction,
}

#[derive(Debug, Subcommand)]
pub enum SqsAction {
    /// Create a standard queue.
    CreateQueue { name: String },
    /// List queue URLs.
    ListQueues {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Look up a queue URL by name.
    GetQueueUrl { name: String },
    /// Send a message.
    Send {
        queue_url: String,
        body: String,
        /// String message attribute, NAME=VALUE. Repeatable.
        #[arg(long = "attribute", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
    },
    /// Receive messages with long polling.
    Receive {
        queue_url: String,
        #[arg(long, default_value = "10")]
        max: i32,
        #[arg(long, default_value_t = MAX_WAIT_SECONDS)]
        wait: i32,
        /// Delete each message after printing it.
        #[arg(long)]
        delete: bool,
    },
    /// Delete a message by receipt handle.
    DeleteMessage {
        queue_url: String,
        receipt_handle: String,
    },
    /// Delete a queue.
    DeleteQueue { queue_url: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: SqsCommand, yes: bool) -> Result<()> {
    let sqs = Sqs::new(sdk_config);
    match cmd.action {
        SqsAction::CreateQueue { name } => println!("{}", sqs.create_queue(&name).await?),
        SqsAction::ListQueues { prefix } => {
            for url in sqs.list_queues(prefix.as_deref()).await? {
                println!("{url}");
            }
        }
        SqsAction::GetQueueUrl { name } => println!("{}", sqs.get_queue_url(&name).await?),
        SqsAction::Send {
            queue_url,
            body,
            attributes,
        } => {
            let id = sqs.send_message(&queue_url, &body, &attributes).await?;
            println!("Sent message {id}");
        }
        SqsAction::Receive {
            queue_url,
            max,
            wait,
            delete,
        } => {
            let messages = sqs.receive_messages(&queue_url, max, wait).await?;
            if messages.is_empty() {
                println!("No messages");
            }
            for message in messages {
                println!("{}: {}", message.message_id, message.body);
                for (name, value) in &message.attributes {
                    println!("  {name} = {value}");
                }
                if delete {
                    sqs.delete_message(&queue_url, &message.receipt_handle).await?;
                }
            }
        }
        SqsAction::DeleteMessage {
            queue_url,
            receipt_handle,
        } => sqs.delete_message(&queue_url, &receipt_handle).await?,
        SqsAction::DeleteQueue { queue_url } => {
            if confirm(&format!("Delete queue {queue_url}"), yes)? {
                sqs.delete_queue(&queue_url).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_collects_attributes() {
        let cmd = SqsCommand::try_parse_from([
            "sqs",
            "send",
            "https://sqs.us-east-1.amazonaws.com/123/demo",
            "hello",
            "--attribute",
            "color=blue",
            "--attribute",
            "size=L",
        ])
        .unwrap();
        match cmd.action {
            SqsAction::Send { attributes, .. } => assert_eq!(
                attributes,
                vec![
                    ("color".to_string(), "blue".to_string()),
                    ("size".to_string(), "L".to_string())
                ]
            ),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn bad_attribute_is_rejected() {
        assert!(SqsCommand::try_parse_from(["sqs", "send", "url", "body", "--attribute", "oops"]).is_err());
    }
}
