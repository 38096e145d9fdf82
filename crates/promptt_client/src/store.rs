//! crates/promptt_client/src/store.rs
//!
//! `PromptStore` and `UsageService` over the record store routes. The server
//! scopes every call by the session token, so `owner_id` only labels results.

use async_trait::async_trait;
use promptt_core::{
    domain::{DailyUsage, NewPromptRecord, PromptRecord},
    ports::{PortError, PortResult, PromptStore, UsageService},
    protocol::{CreatePromptBody, CreatedBody, FavoritePatchBody, PromptRecordBody, UsageBody},
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::{check, transport_error, ApiClient};

pub struct HttpPromptStore {
    api: ApiClient,
}

impl HttpPromptStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> PortResult<reqwest::Response> {
        let response = builder.send().await.map_err(transport_error)?;
        check(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("malformed response body: {}", e)))
}

#[async_trait]
impl PromptStore for HttpPromptStore {
    async fn insert_prompt(&self, record: NewPromptRecord) -> PortResult<Uuid> {
        let body = CreatePromptBody {
            goal: record.goal,
            generated_text: record.generated_text,
            category: record.category.map(|c| c.to_string()),
            is_favorite: record.is_favorite,
        };
        let response = self
            .send(self.api.request(Method::POST, "/prompts").json(&body))
            .await?;
        let created: CreatedBody = decode(response).await?;
        Ok(created.id)
    }

    async fn list_prompts(&self, _owner_id: Uuid) -> PortResult<Vec<PromptRecord>> {
        let response = self.send(self.api.request(Method::GET, "/prompts")).await?;
        let records: Vec<PromptRecordBody> = decode(response).await?;
        Ok(records.into_iter().map(PromptRecordBody::into_domain).collect())
    }

    async fn set_favorite(&self, id: Uuid, _owner_id: Uuid, is_favorite: bool) -> PortResult<()> {
        let path = format!("/prompts/{}", id);
        self.send(
            self.api
                .request(Method::PATCH, &path)
                .json(&FavoritePatchBody { is_favorite }),
        )
        .await?;
        Ok(())
    }

    async fn delete_prompt(&self, id: Uuid, _owner_id: Uuid) -> PortResult<()> {
        let path = format!("/prompts/{}", id);
        self.send(self.api.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl UsageService for HttpPromptStore {
    async fn daily_usage(&self, owner_id: Uuid) -> PortResult<DailyUsage> {
        let response = self.send(self.api.request(Method::GET, "/usage")).await?;
        let usage: UsageBody = decode(response).await?;
        Ok(DailyUsage {
            owner_id,
            day: usage.day,
            used: usage.used,
            limit: usage.limit,
        })
    }
}
