use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;

use crate::credentials::Secret;
use crate::error::ServiceError;
use crate::types::{RequestDescriptor, ResponseValue};

/// Anything that can answer a prompt. One call, one round trip.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn send_request(&self, descriptor: &RequestDescriptor) -> Result<ResponseValue, ServiceError>;
}

/// Client for the OpenAI Responses endpoint.
pub struct OpenAiClient {
    client: Client,
    api_key: Secret,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(api_key: Secret, api_base: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(ServiceError::Client)?,
            api_key,
            endpoint: format!("{}/responses", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn send_request(&self, descriptor: &RequestDescriptor) -> Result<ResponseValue, ServiceError> {
        info!("[Brain] Sending prompt to {} (model {})", self.endpoint, descriptor.model());
        debug!("[Brain] Prompt: {}", descriptor.input());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(descriptor)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let json_resp: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(ServiceError::Decode(format!("{e}: {body}")));
            }
            Err(_) => serde_json::Value::Null,
        };

        if !status.is_success() {
            let message = json_resp["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| body.trim().to_string());
            error!("[Brain] API error ({}): {}", status, message);
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("[Brain] Raw response: {}", json_resp);
        Ok(ResponseValue(json_resp))
    }
}
