use std::env;

use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::{FragmentError, FragmentResult};

/// Backend configuration, read once from the environment at startup.
///
/// The presence of `AWS_REGION` selects the networked backend pair
/// (S3 + DynamoDB); without it both stores run in-process. Mixing backends
/// is not supported.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// AWS region; `Some` switches both stores to the networked backends
    pub region: Option<String>,
    /// Bucket holding fragment data (`AWS_S3_BUCKET_NAME`)
    pub s3_bucket: Option<String>,
    /// Table holding fragment metadata (`AWS_DYNAMODB_TABLE_NAME`)
    pub dynamo_table: Option<String>,
    /// Alternate S3 endpoint, e.g. localstack (`AWS_S3_ENDPOINT_URL`)
    pub s3_endpoint: Option<String>,
    /// Alternate DynamoDB endpoint (`AWS_DYNAMODB_ENDPOINT_URL`)
    pub dynamo_endpoint: Option<String>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        fn get(key: &str) -> Option<String> {
            env::var(key).ok().filter(|value| !value.is_empty())
        }

        Self {
            region: get("AWS_REGION"),
            s3_bucket: get("AWS_S3_BUCKET_NAME"),
            dynamo_table: get("AWS_DYNAMODB_TABLE_NAME"),
            s3_endpoint: get("AWS_S3_ENDPOINT_URL"),
            dynamo_endpoint: get("AWS_DYNAMODB_ENDPOINT_URL"),
        }
    }

    /// Whether the networked backend pair is selected
    pub fn is_aws(&self) -> bool {
        self.region.is_some()
    }

    pub(crate) fn require_s3_bucket(&self) -> FragmentResult<&str> {
        self.s3_bucket
            .as_deref()
            .ok_or_else(|| FragmentError::validation("AWS_S3_BUCKET_NAME is required"))
    }

    pub(crate) fn require_dynamo_table(&self) -> FragmentResult<&str> {
        self.dynamo_table
            .as_deref()
            .ok_or_else(|| FragmentError::validation("AWS_DYNAMODB_TABLE_NAME is required"))
    }

    /// Shared SDK config; credentials come from the default provider chain
    pub(crate) async fn sdk_config(&self) -> FragmentResult<SdkConfig> {
        let region = self
            .region
            .clone()
            .ok_or_else(|| FragmentError::validation("AWS_REGION is required"))?;

        Ok(aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_aws_follows_region() {
        assert!(!StorageConfig::default().is_aws());

        let config = StorageConfig {
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        assert!(config.is_aws());
    }

    #[test]
    fn test_aws_requires_bucket_and_table() {
        let config = StorageConfig {
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        assert!(config.require_s3_bucket().is_err());
        assert!(config.require_dynamo_table().is_err());

        let config = StorageConfig {
            region: Some("us-east-1".to_string()),
            s3_bucket: Some("fragments".to_string()),
            dynamo_table: Some("fragments".to_string()),
            ..Default::default()
        };
        assert_eq!(config.require_s3_bucket().unwrap(), "fragments");
        assert_eq!(config.require_dynamo_table().unwrap(), "fragments");
    }
}
