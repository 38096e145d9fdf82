//! crates/promptt_client/src/gateway.rs
//!
//! `GenerationGateway` over `POST /generate-prompt`.

use async_trait::async_trait;
use promptt_core::{
    domain::GenerationRequest,
    ports::{GatewayReply, GenerationGateway, PortError, PortResult},
    protocol::{GenerateRequestBody, GenerateResponseBody},
};
use reqwest::{Method, StatusCode};
use tracing::warn;

use crate::http::{error_message, transport_error, ApiClient};

pub struct HttpGenerationGateway {
    api: ApiClient,
    api_key: Option<String>,
}

impl HttpGenerationGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api, api_key: None }
    }

    /// Forwards a caller-held model key. Only deployments that allow it will use it.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }
}

#[async_trait]
impl GenerationGateway for HttpGenerationGateway {
    async fn generate(&self, request: &GenerationRequest) -> PortResult<GatewayReply> {
        let body = GenerateRequestBody {
            goal: request.goal.clone(),
            category: request.category.map(|c| c.to_string()),
            api_key: self.api_key.clone(),
        };
        let response = self
            .api
            .request(Method::POST, "/generate-prompt")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PortError::QuotaExceeded);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            warn!("generate-prompt answered {}: {}", status, message);
            return Err(PortError::Rejected(message));
        }

        let body: GenerateResponseBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("malformed generate-prompt reply: {}", e)))?;
        Ok(GatewayReply {
            generated_prompt: body.generated_prompt,
        })
    }
}
