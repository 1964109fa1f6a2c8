use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_types::region::Region;

/// Attempts per call before a throttled or failed request is given up on.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub max_attempts: u32,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

pub async fn configure_aws(settings: &AwsSettings) -> aws_types::SdkConfig {
    let region_provider = RegionProviderChain::first_try(settings.region.clone().map(Region::new))
        .or_default_provider();

    let mut loader = aws_config::defaults(BehaviorVersion::v2024_03_28())
        .region(region_provider)
        .retry_config(RetryConfig::standard().with_max_attempts(settings.max_attempts.max(1)));
    if let Some(profile) = settings.profile.as_deref() {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}
