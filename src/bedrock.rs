use anyhow::{anyhow, Result};
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};

use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Optional knobs for a Converse call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConverseOptions<'a> {
    pub system_prompt: Option<&'a str>,
    /// 0 (more conservative) to 1 (more variety).
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

/// Bedrock model catalog and Converse samples.
#[derive(Debug, Clone)]
pub struct Bedrock {
    control: aws_sdk_bedrock::Client,
    runtime: aws_sdk_bedrockruntime::Client,
}

impl Bedrock {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            control: aws_sdk_bedrock::Client::new(sdk_config),
            runtime: aws_sdk_bedrockruntime::Client::new(sdk_config),
        }
    }

    pub async fn list_foundation_models(&self, provider: Option<&str>) -> Result<Vec<ModelSummary>> {
        let output = self
            .control
            .list_foundation_models()
            .set_by_provider(provider.map(str::to_string))
            .send()
            .await
            .map_err(|e| service_error("ListFoundationModels", e))?;
        Ok(output
            .model_summaries()
            .iter()
            .map(|model| ModelSummary {
                id: model.model_id().to_string(),
                name: model.model_name().unwrap_or_default().to_string(),
                provider: model.provider_name().unwrap_or_default().to_string(),
            })
            .collect())
    }

    /// Sends one user message and returns the model's text reply.
    pub async fn converse(&self, model_id: &str, prompt: &str, options: &ConverseOptions<'_>) -> Result<String> {
        let response = self
            .runtime
            .converse()
            .model_id(model_id)
            .inference_config(
                InferenceConfiguration::builder()
                    .set_temperature(options.temperature)
                    .set_max_tokens(options.max_tokens)
                    .build(),
            )
            .set_system(
                options
                    .system_prompt
                    .map(|system_prompt| vec![SystemContentBlock::Text(system_prompt.to_owned())]),
            )
            .messages(
                Message::builder()
                    .role(ConversationRole::User)
                    .content(ContentBlock::Text(prompt.to_owned()))
                    .build()?,
            )
            .send()
            .await
            .map_err(|e| service_error("Converse", e))?;

        let message = response
            .output()
            .ok_or_else(|| anyhow!("model returned no output"))?
            .as_message()
            .map_err(|_| anyhow!("model returned a non-message output"))?;
        reply_text(message.content())
    }
}

/// Concatenates the text blocks of a reply.
fn reply_text(content: &[ContentBlock]) -> Result<String> {
    let text: Vec<&str> = content
        .iter()
        .filter_map(|block| block.as_text().ok().map(String::as_str))
        .collect();
    if text.is_empty() {
        return Err(anyhow!("model returned no text content"));
    }
    Ok(text.join(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_joins_text_blocks() {
        let content = vec![
            ContentBlock::Text("Hello, ".to_string()),
            ContentBlock::Text("world".to_string()),
        ];
        assert_eq!(reply_text(&content).unwrap(), "Hello, world");
        assert!(reply_text(&[]).is_err());
    }
}
