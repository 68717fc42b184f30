use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use crate::bedrock::{Bedrock, ConverseOptions};

#[derive(Debug, Parser)]
pub struct BedrockCommand {
    #[command(subcommand)]
    pub action: BedrockAction,
}

#[derive(Debug, Subcommand)]
pub enum BedrockAction {
    /// List foundation models, optionally from one provider (e.g. Anthropic).
    ListModels {
        #[arg(long)]
        provider: Option<String>,
    },
    /// Send one prompt through the Converse API and print the reply.
    Converse {
        model_id: String,
        prompt: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long, default_value_t = 512)]
        max_tokens: i32,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: BedrockCommand) -> Result<()> {
    let bedrock = Bedrock::new(sdk_config);
    match cmd.action {
        BedrockAction::ListModels { provider } => {
            let models = bedrock.list_foundation_models(provider.as_deref()).await?;
            for model in &models {
                println!("{}  {}  {}", model.id, model.provider, model.name);
            }
            println!("Found {} models", models.len());
        }
        BedrockAction::Converse {
            model_id,
            prompt,
            system,
            temperature,
            max_tokens,
        } => {
            let options = ConverseOptions {
                system_prompt: system.as_deref(),
                temperature,
                max_tokens: Some(max_tokens),
            };
            println!("{}", bedrock.converse(&model_id, &prompt, &options).await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converse_takes_model_and_prompt() {
        let cmd = BedrockCommand::try_parse_from([
            "bedrock",
            "converse",
            "anthropic.claude-3-haiku-20240307-v1:0",
            "Say hello",
            "--temperature",
            "0.2",
        ])
        .unwrap();
        match cmd.action {
            BedrockAction::Converse {
                temperature,
                max_tokens,
                system,
                ..
            } => {
                assert_eq!(temperature, Some(0.2));
                assert_eq!(max_tokens, 512);
                assert_eq!(system, None);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
