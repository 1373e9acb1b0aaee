/// Container cluster API client
use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::{ClusterTargetHeader, ErrorResponse};
use crate::config::SessionConfig;

/// Error returned when the API answers with a non-success status
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed with status {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
}

impl ApiError {
    /// HTTP status carried by the error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Status { status, .. } => *status,
        }
    }
}

/// Client for the container cluster management API
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    endpoint: Url,
}

impl ClusterClient {
    /// Create a new client for the given endpoint
    pub fn new(endpoint: &str, iam_token: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid API endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("API endpoint cannot be used as a base URL: {}", endpoint);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", iam_token))
                .context("Invalid IAM token format")?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    /// Create a client from a session configuration
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let token = config.get_iam_token()?;
        Self::new(
            &config.endpoint,
            &token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build the request URL, encoding each path segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid API endpoint: {}", self.endpoint))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the target headers
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        target: &ClusterTargetHeader,
    ) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .headers(target.to_headers()?))
    }

    /// Make a GET request to the API
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        target: &ClusterTargetHeader,
    ) -> Result<T> {
        let response = self
            .request(Method::GET, segments, target)?
            .send()
            .await
            .context("Failed to send GET request")?;

        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .context("Failed to parse API response")
    }

    /// Make a POST request to the API
    pub(crate) async fn post<T: Serialize>(
        &self,
        segments: &[&str],
        body: &T,
        target: &ClusterTargetHeader,
    ) -> Result<()> {
        let response = self
            .request(Method::POST, segments, target)?
            .json(body)
            .send()
            .await
            .context("Failed to send POST request")?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Make a PUT request to the API
    pub(crate) async fn put<T: Serialize>(
        &self,
        segments: &[&str],
        body: &T,
        target: &ClusterTargetHeader,
    ) -> Result<()> {
        let response = self
            .request(Method::PUT, segments, target)?
            .json(body)
            .send()
            .await
            .context("Failed to send PUT request")?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Make a DELETE request to the API
    pub(crate) async fn delete(&self, segments: &[&str], target: &ClusterTargetHeader) -> Result<()> {
        let response = self
            .request(Method::DELETE, segments, target)?
            .send()
            .await
            .context("Failed to send DELETE request")?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Turn a non-success response into an `ApiError`
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();

        let error = match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(error_response) => ApiError::Status {
                status,
                code: Some(error_response.code),
                message: error_response.description,
            },
            Err(_) => ApiError::Status {
                status,
                code: None,
                message: error_text,
            },
        };
        Err(error.into())
    }
}
