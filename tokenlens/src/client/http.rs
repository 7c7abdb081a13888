//! reqwest-backed client for the `/generate` endpoint

use super::{ClientError, GenerationClient, GenerationRequest};
use crate::annotation::GenerationResponse;
use crate::ClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP client for a generation server
pub struct HttpGenerationClient {
    client: Client,
    url: String,
    name: String,
}

impl HttpGenerationClient {
    /// Create a client for `base_url` with the default path and timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let config = ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/');
        let path = config.generate_path.trim_start_matches('/');
        let url = format!("{}/{}", base_url, path);

        Ok(Self {
            client,
            name: format!("http:{}", base_url),
            url,
        })
    }

    /// Full endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pull a non-empty string `detail` out of an error body, if there is one
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ClientError> {
        let start = Instant::now();

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Received generation response"
        );

        if !status.is_success() {
            return Err(match error_detail(&body) {
                Some(detail) => ClientError::Server {
                    status: status.as_u16(),
                    detail,
                },
                None => ClientError::Status(status.as_u16()),
            });
        }

        Ok(GenerationResponse::from_json(&body)?)
    }
}
