use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use super::prompt::confirm;
use crate::sns::Sns;

#[derive(Debug, Parser)]
pub struct SnsCommand {
    #[command(subcommand)]
    pub action: SnsAction,
}

#[derive(Debug, Subcommand)]
pub enum SnsAction {
    /// Create a topic (idempotent) and print its ARN.
    CreateTopic { name: String },
    ListTopics,
    /// Subscribe an endpoint, e.g. `email user@example.com`.
    Subscribe {
        topic_arn: String,
        protocol: String,
        endpoint: String,
    },
    Publish {
        topic_arn: String,
        message: String,
        #[arg(long)]
        subject: Option<String>,
    },
    DeleteTopic { topic_arn: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: SnsCommand, yes: bool) -> Result<()> {
    let sns = Sns::new(sdk_config);
    match cmd.action {
        SnsAction::CreateTopic { name } => println!("{}", sns.create_topic(&name).await?),
        SnsAction::ListTopics => {
            let topics = sns.list_topics().await?;
            topics.iter().for_each(|t| println!("{t}"));
            println!("Found {} topics", topics.len());
        }
        SnsAction::Subscribe {
            topic_arn,
            protocol,
            endpoint,
        } => {
            let subscription = sns.subscribe(&topic_arn, &protocol, &endpoint).await?;
            println!("Subscription: {subscription}");
        }
        SnsAction::Publish {
            topic_arn,
            message,
            subject,
        } => {
            let id = sns.publish(&topic_arn, &message, subject.as_deref()).await?;
            println!("Published message {id}");
        }
        SnsAction::DeleteTopic { topic_arn } => {
            if confirm(&format!("Delete topic {topic_arn}"), yes)? {
                sns.delete_topic(&topic_arn).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_subject_is_optional() {
        let cmd = SnsCommand::try_parse_from(["sns", "publish", "arn:topic", "hello"]).unwrap();
        match cmd.action {
            SnsAction::Publish { subject, message, .. } => {
                assert_eq!(subject, None);
                assert_eq!(message, "hello");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn subscribe_needs_an_endpoint() {
        assert!(SnsCommand::try_parse_from(["sns", "subscribe", "arn:topic", "email"]).is_err());
    }
}
