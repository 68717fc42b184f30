use anyhow::{anyhow, Result};
use aws_sdk_lexmodelbuilding::operation::get_bot::GetBotOutput;
use aws_sdk_lexmodelbuilding::operation::put_bot::builders::PutBotFluentBuilder;
use aws_sdk_lexmodelbuilding::types::{ProcessBehavior, Status};
use aws_sdk_lexmodelbuilding::Client;
use tokio::time::Duration;
use tracing::info;

use crate::error::service_error;
use crate::utils::{poll_until, PollState};

/// Alias for the draft version of a bot.
pub const LATEST: &str = "$LATEST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSummary {
    pub name: String,
    pub status: String,
    pub version: String,
}

/// Lex (V1 model building) samples.
#[derive(Debug, Clone)]
pub struct Lex {
    client: Client,
}

impl Lex {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub async fn list_bots(&self) -> Result<Vec<BotSummary>> {
        let mut pages = self.client.get_bots().into_paginator().send();

        let mut bots = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("GetBots", e))?;
            bots.extend(page.bots().iter().map(|bot| BotSummary {
                name: bot.name().unwrap_or_default().to_string(),
                status: bot.status().map(|s| s.as_str().to_string()).unwrap_or_default(),
                version: bot.version().unwrap_or_default().to_string(),
            }));
        }
        Ok(bots)
    }

    /// Current build status of the bot's draft version, plus the failure reason if any.
    pub async fn get_bot_status(&self, name: &str) -> Result<(Option<Status>, Option<String>)> {
        let output = self
            .client
            .get_bot()
            .name(name)
            .version_or_alias(LATEST)
            .send()
            .await
            .map_err(|e| service_error("GetBot", e))?;
        Ok((output.status().cloned(), output.failure_reason().map(str::to_string)))
    }

    /// Rebuilds the draft version of an existing bot.
    ///
    /// PutBot replaces the whole `$LATEST` configuration, so every setting
    /// read from GetBot is sent back along with the current checksum.
    pub async fn build_bot(&self, name: &str) -> Result<()> {
        let current = self
            .client
            .get_bot()
            .name(name)
            .version_or_alias(LATEST)
            .send()
            .await
            .map_err(|e| service_error("GetBot", e))?;

        rebuild_request(self.client.put_bot(), name, &current)?
            .send()
            .await
            .map_err(|e| service_error("PutBot", e))?;
        info!("Build started for bot {name}");
        Ok(())
    }

    /// Polls until the bot is READY (or READY_BASIC_TESTING).
    pub async fn wait_for_bot_ready(&self, name: &str, interval: Duration, max_attempts: usize) -> Result<Status> {
        poll_until(
            &format!("bot {name}"),
            || async move {
                let (status, reason) = self.get_bot_status(name).await?;
                Ok(bot_poll_state(status, reason))
            },
            interval,
            max_attempts,
        )
        .await
    }
}

/// PutBot request that rebuilds `current` unchanged.
fn rebuild_request(
    request: PutBotFluentBuilder,
    name: &str,
    current: &GetBotOutput,
) -> Result<PutBotFluentBuilder> {
    let checksum = current
        .checksum()
        .ok_or_else(|| anyhow!("Bot {name} has no checksum"))?;
    Ok(request
        .name(name)
        .checksum(checksum)
        .set_description(current.description().map(str::to_string))
        .set_intents(current.intents.clone())
        .set_enable_model_improvements(current.enable_model_improvements())
        .set_nlu_intent_confidence_threshold(current.nlu_intent_confidence_threshold())
        .set_clarification_prompt(current.clarification_prompt.clone())
        .set_abort_statement(current.abort_statement.clone())
        .set_idle_session_ttl_in_seconds(current.idle_session_ttl_in_seconds())
        .set_voice_id(current.voice_id().map(str::to_string))
        .set_locale(current.locale().cloned())
        .set_child_directed(current.child_directed())
        .set_detect_sentiment(current.detect_sentiment())
        .process_behavior(ProcessBehavior::Build))
}

fn bot_poll_state(status: Option<Status>, failure_reason: Option<String>) -> PollState<Status> {
    match status {
        Some(status @ (Status::Ready | Status::ReadyBasicTesting)) => PollState::Ready(status),
        Some(Status::Failed) => {
            PollState::Failed(failure_reason.unwrap_or_else(|| "no reason given".to_string()))
        }
        Some(other) => PollState::Pending(other.as_str().to_string()),
        None => PollState::Pending("UNKNOWN".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_lexmodelbuilding::config::{BehaviorVersion, Region};
    use aws_sdk_lexmodelbuilding::types::Locale;

    fn offline_client() -> Client {
        let config = aws_sdk_lexmodelbuilding::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn rebuild_keeps_every_bot_setting() {
        let current = GetBotOutput::builder()
            .name("OrderFlowers")
            .checksum("abc123")
            .description("Orders flowers")
            .idle_session_ttl_in_seconds(600)
            .voice_id("Joanna")
            .detect_sentiment(true)
            .enable_model_improvements(true)
            .nlu_intent_confidence_threshold(0.4)
            .locale(Locale::EnUs)
            .child_directed(false)
            .build();

        let request = rebuild_request(offline_client().put_bot(), "OrderFlowers", &current).unwrap();
        let input = request.as_input();
        assert_eq!(input.get_checksum().as_deref(), Some("abc123"));
        assert_eq!(input.get_description().as_deref(), Some("Orders flowers"));
        assert_eq!(*input.get_idle_session_ttl_in_seconds(), Some(600));
        assert_eq!(input.get_voice_id().as_deref(), Some("Joanna"));
        assert_eq!(*input.get_detect_sentiment(), Some(true));
        assert_eq!(*input.get_enable_model_improvements(), Some(true));
        assert_eq!(*input.get_nlu_intent_confidence_threshold(), Some(0.4));
        assert_eq!(input.get_locale(), &Some(Locale::EnUs));
        assert_eq!(*input.get_child_directed(), Some(false));
        assert_eq!(input.get_process_behavior(), &Some(ProcessBehavior::Build));
    }

    #[test]
    fn rebuild_needs_a_checksum() {
        let current = GetBotOutput::builder().name("OrderFlowers").build();
        assert!(rebuild_request(offline_client().put_bot(), "OrderFlowers", &current).is_err());
    }

    #[test]
    fn bot_states() {
        assert_eq!(bot_poll_state(Some(Status::Ready), None), PollState::Ready(Status::Ready));
        assert_eq!(
            bot_poll_state(Some(Status::Building), None),
            PollState::Pending("BUILDING".to_string())
        );
        assert_eq!(
            bot_poll_state(Some(Status::Failed), Some("missing slot".to_string())),
            PollState::Failed("missing slot".to_string())
        );
    }
}
