/// Session configuration for the container cluster API
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::k8scluster::models::ClusterTargetHeader;

/// Environment variable holding the IAM token
pub const IAM_TOKEN_ENV: &str = "K8SCLUSTER_IAM_TOKEN";

/// API session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the container cluster API
    pub endpoint: String,

    /// IAM token (can also be set via K8SCLUSTER_IAM_TOKEN env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default tenant scope for requests
    #[serde(default)]
    pub target: ClusterTargetHeader,
}

fn default_timeout_secs() -> u64 {
    30
}

impl SessionConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid endpoint {}: {}", self.endpoint, e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("endpoint must be an http(s) URL: {}", self.endpoint);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Get the IAM token from config or environment
    pub fn get_iam_token(&self) -> anyhow::Result<String> {
        self.iam_token
            .clone()
            .or_else(|| std::env::var(IAM_TOKEN_ENV).ok())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "IAM token not found. Set {} environment variable or specify iam_token in config",
                    IAM_TOKEN_ENV
                )
            })
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            endpoint: "https://containers.cloud.example.com".to_string(),
            iam_token: None,
            timeout_secs: default_timeout_secs(),
            target: ClusterTargetHeader {
                org_id: "my-org-guid".to_string(),
                space_id: "my-space-guid".to_string(),
                account_id: "my-account-id".to_string(),
            },
        }
    }
}
