use anyhow::{anyhow, Result};
use aws_sdk_ssm::types::{ParameterMetadata, ParameterType};
use aws_sdk_ssm::Client;
use tracing::info;

use crate::error::service_error;

/// Systems Manager Parameter Store samples.
#[derive(Debug, Clone)]
pub struct Ssm {
    client: Client,
}

impl Ssm {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Reads a parameter, decrypting SecureString values.
    pub async fn get_parameter(&self, name: &str) -> Result<String> {
        let output = match self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_parameter_not_found()) => {
                return Err(anyhow!("Parameter {name} does not exist"));
            }
            Err(e) => return Err(service_error("GetParameter", e)),
        };
        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Parameter {name} has no value"))
    }

    /// Writes a parameter, overwriting an existing one; returns the new version.
    pub async fn put_parameter(&self, name: &str, value: &str, secure: bool) -> Result<i64> {
        let output = self
            .client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(parameter_type(secure))
            .overwrite(true)
            .send()
            .await
            .map_err(|e| service_error("PutParameter", e))?;
        info!("Parameter {name} is at version {}", output.version());
        Ok(output.version())
    }

    /// Names and types of every parameter visible to the caller.
    pub async fn describe_parameters(&self) -> Result<Vec<(String, String)>> {
        let parameters: Vec<_> = self
            .client
            .describe_parameters()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("DescribeParameters", e))?;
        Ok(parameters.iter().map(name_and_type).collect())
    }

    pub async fn delete_parameter(&self, name: &str) -> Result<()> {
        self.client
            .delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| service_error("DeleteParameter", e))?;
        info!("Deleted parameter {name}");
        Ok(())
    }
}

fn parameter_type(secure: bool) -> ParameterType {
    if secure {
        ParameterType::SecureString
    } else {
        ParameterType::String
    }
}

fn name_and_type(parameter: &ParameterMetadata) -> (String, String) {
    (
        parameter.name().unwrap_or_default().to_string(),
        parameter
            .r#type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_values_are_encrypted() {
        assert_eq!(parameter_type(true), ParameterType::SecureString);
        assert_eq!(parameter_type(false), ParameterType::String);
    }

    #[test]
    fn listing_shows_name_and_type() {
        let parameter = ParameterMetadata::builder()
            .name("/app/db/password")
            .r#type(ParameterType::SecureString)
            .build();
        assert_eq!(
            name_and_type(&parameter),
            ("/app/db/password".to_string(), "SecureString".to_string())
        );
    }
}
