use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Overrides applied on top of the default AWS provider chain.
///
/// Anything left as `None` falls back to the environment, the shared config
/// files, or instance metadata, exactly as `aws_config::load_from_env` does.
#[derive(Debug, Clone, Default)]
pub struct SampleConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

impl SampleConfig {
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;
        debug!(region = ?config.region(), "Loaded AWS configuration");
        config
    }
}

/// Region name of a loaded config, defaulting to `us-east-1` like the services do.
pub fn region_name(config: &SdkConfig) -> &str {
    config.region().map(|r| r.as_ref()).unwrap_or("us-east-1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_region_wins() {
        let config = SampleConfig {
            region: Some("eu-west-3".to_string()),
            ..Default::default()
        }
        .load()
        .await;
        assert_eq!(region_name(&config), "eu-west-3");
    }

    #[test]
    fn missing_region_defaults_to_us_east_1() {
        let config = SdkConfig::builder().build();
        assert_eq!(region_name(&config), "us-east-1");
    }
}
