//! AWS Auto Scaling implementation of the provider traits.
//!
//! Uses the AWS SDK for Rust with the standard credential chain
//! (environment, instance profile, etc.).

use async_trait::async_trait;
use aws_sdk_autoscaling::Client;
use chrono::{DateTime, Utc};

use super::{
    GroupDescription, GroupLister, GroupPage, GroupTerminator, ProviderError, ProviderResult,
};

/// Configuration for the AWS Auto Scaling client.
#[derive(Debug, Clone)]
pub struct AutoScalingProviderConfig {
    /// AWS region (e.g., "eu-west-1")
    pub region: Option<String>,
    /// Optional endpoint URL for testing with localstack
    pub endpoint_url: Option<String>,
}

impl AutoScalingProviderConfig {
    /// Create a new config with the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            endpoint_url: None,
        }
    }

    /// Create a new config using the default region from environment.
    pub fn from_env() -> Self {
        Self {
            region: None,
            endpoint_url: None,
        }
    }

    /// Set a custom endpoint URL (useful for localstack testing).
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }
}

/// AWS Auto Scaling provider.
pub struct AutoScalingProvider {
    client: Client,
}

impl AutoScalingProvider {
    /// Create a new Auto Scaling client with the given configuration.
    pub async fn new(config: AutoScalingProviderConfig) -> Self {
        let mut aws_config = aws_config::from_env();

        if let Some(region) = &config.region {
            aws_config = aws_config.region(aws_config::Region::new(region.clone()));
        }

        let aws_config = aws_config.load().await;

        let mut asg_config = aws_sdk_autoscaling::config::Builder::from(&aws_config);

        if let Some(endpoint_url) = &config.endpoint_url {
            asg_config = asg_config.endpoint_url(endpoint_url);
        }

        Self {
            client: Client::from_conf(asg_config.build()),
        }
    }
}

#[async_trait]
impl GroupLister for AutoScalingProvider {
    async fn list_page(&self, next_token: Option<String>) -> ProviderResult<GroupPage> {
        let output = self
            .client
            .describe_auto_scaling_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ProviderError::List(e.into_service_error().to_string()))?;

        // Groups without a name or creation time cannot be evaluated; the
        // listing model marks both as optional, so skip rather than fail.
        let groups = output
            .auto_scaling_groups()
            .iter()
            .filter_map(|asg| {
                let name = asg.auto_scaling_group_name()?.to_string();
                let created_at = asg.created_time().and_then(to_chrono)?;
                Some(GroupDescription { name, created_at })
            })
            .collect();

        Ok(GroupPage {
            groups,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl GroupTerminator for AutoScalingProvider {
    async fn force_delete(&self, name: &str) -> ProviderResult<()> {
        self.client
            .delete_auto_scaling_group()
            .auto_scaling_group_name(name)
            .force_delete(true)
            .send()
            .await
            .map_err(|e| ProviderError::Delete {
                name: name.to_string(),
                message: e.into_service_error().to_string(),
            })?;
        Ok(())
    }
}

fn to_chrono(ts: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = AutoScalingProviderConfig::new("us-west-2")
            .with_endpoint_url("http://localhost:4566");

        assert_eq!(config.region, Some("us-west-2".to_string()));
        assert_eq!(
            config.endpoint_url,
            Some("http://localhost:4566".to_string())
        );
    }

    #[test]
    fn test_config_from_env() {
        let config = AutoScalingProviderConfig::from_env();
        assert_eq!(config.region, None);
        assert_eq!(config.endpoint_url, None);
    }

    #[test]
    fn test_smithy_timestamp_conversion() {
        let ts = aws_smithy_types::DateTime::from_secs(1_704_067_200);
        let converted = to_chrono(&ts).unwrap();
        assert_eq!(converted.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
